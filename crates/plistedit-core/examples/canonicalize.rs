use plistedit_core::{encode_plist, parse_plist};

fn main() {
    let source = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
  <dict>
    <key>CFBundleName</key>     <string>Example</string>
    <key>LSMinimumSystemVersion</key> <string>10.15</string>
    <key>Build</key><integer>42</integer>
  </dict>
</plist>"#;

    match parse_plist(source) {
        Ok(root) => {
            print!("{}", encode_plist(&root));
        }
        Err(err) => {
            eprintln!("decoding failed: {}", err);
            std::process::exit(1);
        }
    }
}
