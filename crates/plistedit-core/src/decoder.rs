use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::{debug, warn};

use crate::allocator::IdAllocator;
use crate::errors::PListError;
use crate::node::{Dictionary, Node, PListDate, PListRoot, Value};
use crate::options::{DecodeOptions, DuplicateKeys};
use crate::path::NodePath;
use crate::xml::{parse_xml, XmlElement};

/// Base64 flavor accepted inside `<data>`: standard alphabet, padding
/// optional, non-zero trailing bits tolerated.
const DATA_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decodes `text` with the default (lenient) options.
pub fn parse_plist(text: &str) -> Result<PListRoot, PListError> {
    Decoder::default().decode(text)
}

/// Decodes `text` with explicit options.
pub fn parse_plist_with(text: &str, options: &DecodeOptions) -> Result<PListRoot, PListError> {
    Decoder::new(*options).decode(text)
}

/// Recursive-descent decoder from XML text to a [`PListRoot`].
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    options: DecodeOptions,
}

impl Decoder {
    /// Creates a decoder with the given options.
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Options in effect.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Parses the document, checks the `<plist version="1.0"><dict>` envelope
    /// and decodes the top-level dictionary with a fresh allocator.
    pub fn decode(&self, text: &str) -> Result<PListRoot, PListError> {
        let document = parse_xml(text)?;
        let root = document.root();

        if root.name() != "plist" {
            return Err(PListError::Format(format!(
                "root element is <{}>, expected <plist>",
                root.name()
            )));
        }
        match root.attribute("version") {
            Some("1.0") => {}
            Some(other) => {
                return Err(PListError::Format(format!(
                    "unsupported plist version '{}'",
                    other
                )))
            }
            None => {
                return Err(PListError::Format(
                    "plist element has no version attribute".to_string(),
                ))
            }
        }
        let mut children = root.children();
        let dict = match (children.next(), children.next()) {
            (Some(dict), None) if dict.name() == "dict" => dict,
            (Some(other), None) => {
                return Err(PListError::Format(format!(
                    "plist must contain a <dict>, found <{}>",
                    other.name()
                )))
            }
            (None, _) => {
                return Err(PListError::Format("plist element is empty".to_string()))
            }
            (Some(_), Some(_)) => {
                return Err(PListError::Format(format!(
                    "plist must contain exactly one element, found {}",
                    root.child_count()
                )))
            }
        };

        let mut allocator = IdAllocator::new();
        let entries = self.parse_plist_dict_value(dict, &mut allocator, &NodePath::root())?;
        let id = allocator.next_value();
        debug!(
            "decoded property list: {} top-level entries, {} nodes",
            entries.len(),
            id
        );
        Ok(PListRoot {
            id,
            entries,
            allocator,
        })
    }

    /// Decodes one value element, dispatching on its tag.
    pub fn parse_plist_value(
        &self,
        element: &XmlElement,
        allocator: &mut IdAllocator,
        path: &NodePath,
    ) -> Result<Node, PListError> {
        let value = match element.name() {
            "string" => Value::String(canonical_line_breaks(&element.text_content())),
            "integer" | "real" => Value::Number(self.parse_number(element, path)?),
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            "date" => Value::Date(self.parse_date(element, path)?),
            "data" => Value::Data(parse_data(element, path)?),
            "array" => {
                let mut items = Vec::new();
                for (idx, child) in element.children().enumerate() {
                    items.push(self.parse_plist_value(child, allocator, &path.push_index(idx))?);
                }
                Value::Array(items)
            }
            "dict" => Value::Dictionary(self.parse_plist_dict_value(element, allocator, path)?),
            other => {
                return Err(PListError::UnknownType {
                    tag: other.to_string(),
                    path: path.to_string(),
                })
            }
        };
        Ok(allocator.new_item(value))
    }

    /// Decodes the alternating key/value children of a `<dict>` element.
    pub fn parse_plist_dict_value(
        &self,
        element: &XmlElement,
        allocator: &mut IdAllocator,
        path: &NodePath,
    ) -> Result<Dictionary, PListError> {
        let children: Vec<&XmlElement> = element.children().collect();
        let mut entries = Dictionary::with_capacity(children.len() / 2);

        for pair in children.chunks(2) {
            let key_element = pair[0];
            if self.options.is_strict() && key_element.name() != "key" {
                return Err(PListError::Format(format!(
                    "expected <key> in dictionary at {}, found <{}>",
                    path,
                    key_element.name()
                )));
            }
            let key = canonical_line_breaks(key_element.text_content().trim());

            let Some(value_element) = pair.get(1) else {
                if self.options.is_strict() {
                    return Err(PListError::DanglingKey {
                        key,
                        path: path.to_string(),
                    });
                }
                warn!("dropping key '{}' without a value at {}", key, path);
                break;
            };

            if self.options.duplicate_keys == DuplicateKeys::Reject && entries.contains_key(&key) {
                return Err(PListError::DuplicateKey {
                    key,
                    path: path.to_string(),
                });
            }

            let value = self.parse_plist_value(value_element, allocator, &path.push_key(&key))?;
            entries.insert(key, value);
        }

        Ok(entries)
    }

    fn parse_number(&self, element: &XmlElement, path: &NodePath) -> Result<f64, PListError> {
        let text = element.text_content();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(0.0);
        }
        let whole = trimmed.parse::<f64>().ok().filter(|value| value.is_finite());
        if let Some(value) = whole {
            return Ok(value);
        }
        if self.options.is_strict() {
            return Err(PListError::MalformedValue {
                tag: element.name().to_string(),
                text,
                path: path.to_string(),
            });
        }
        match leading_number(trimmed) {
            Some(value) => {
                warn!("reading number '{}' at {} as {}", trimmed, path, value);
                Ok(value)
            }
            None => {
                warn!("unreadable number '{}' at {}, using 0", trimmed, path);
                Ok(0.0)
            }
        }
    }

    fn parse_date(&self, element: &XmlElement, path: &NodePath) -> Result<PListDate, PListError> {
        let text = element.text_content();
        match parse_timestamp(&text) {
            Some(timestamp) => Ok(PListDate::from(timestamp)),
            None if self.options.is_strict() => Err(PListError::MalformedValue {
                tag: element.name().to_string(),
                text,
                path: path.to_string(),
            }),
            None => {
                warn!("unreadable date '{}' at {}", text.trim(), path);
                Ok(PListDate::Invalid)
            }
        }
    }
}

fn parse_data(element: &XmlElement, path: &NodePath) -> Result<Vec<u8>, PListError> {
    let compact: String = element
        .text_content()
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    DATA_ENGINE
        .decode(compact.as_bytes())
        .map_err(|err| PListError::InvalidData {
            path: path.to_string(),
            reason: err.to_string(),
        })
}

/// Longest prefix of `text` that reads as a finite decimal number
/// (`12px` is 12, `1.5e` is 1.5).
fn leading_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let digits_from = |mut idx: usize| {
        while bytes.get(idx).is_some_and(u8::is_ascii_digit) {
            idx += 1;
        }
        idx
    };

    let mut end = match bytes.first() {
        Some(b'+' | b'-') => 1,
        _ => 0,
    };
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if has_digits || frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    text[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Reads RFC 3339 timestamps, zone-less date-times (as UTC) and bare dates.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Line breaks in text are held as `\n` in memory whatever their wire form.
fn canonical_line_breaks(text: &str) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use chrono::{Datelike, Timelike};
    use std::cell::RefCell;
    use std::sync::Once;

    thread_local! {
        static WARNINGS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    /// Records warnings per test thread.
    struct CaptureLogger;

    impl log::Log for CaptureLogger {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                WARNINGS.with(|w| w.borrow_mut().push(record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger;
    static INIT: Once = Once::new();

    fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
        INIT.call_once(|| {
            let _ = log::set_logger(&LOGGER);
            log::set_max_level(log::LevelFilter::Warn);
        });
        WARNINGS.with(|w| w.borrow_mut().clear());
        let out = f();
        (out, WARNINGS.with(|w| w.borrow_mut().drain(..).collect()))
    }

    fn wrap(body: &str) -> String {
        format!(r#"<plist version="1.0"><dict>{}</dict></plist>"#, body)
    }

    fn decode_value(fragment: &str) -> Result<Node, PListError> {
        let doc = parse_xml(fragment).unwrap();
        let mut allocator = IdAllocator::new();
        Decoder::default().parse_plist_value(doc.root(), &mut allocator, &NodePath::root())
    }

    #[test]
    fn decodes_every_scalar_kind() {
        assert_eq!(
            decode_value("<string>hi</string>").unwrap().value,
            Value::String("hi".into())
        );
        assert_eq!(decode_value("<string/>").unwrap().value, Value::String(String::new()));
        assert_eq!(decode_value("<integer>42</integer>").unwrap().value, Value::Number(42.0));
        assert_eq!(decode_value("<real> -2.5 </real>").unwrap().value, Value::Number(-2.5));
        assert_eq!(decode_value("<true/>").unwrap().value, Value::Boolean(true));
        assert_eq!(decode_value("<false/>").unwrap().value, Value::Boolean(false));
        assert_eq!(
            decode_value("<data>AAEC/w==</data>").unwrap().value,
            Value::Data(vec![0, 1, 2, 255])
        );
    }

    #[test]
    fn lenient_numbers_default_to_zero() {
        assert_eq!(decode_value("<integer/>").unwrap().value, Value::Number(0.0));
        assert_eq!(decode_value("<real>abc</real>").unwrap().value, Value::Number(0.0));
        assert_eq!(decode_value("<real>.</real>").unwrap().value, Value::Number(0.0));
    }

    #[test]
    fn lenient_numbers_read_leading_digits() {
        assert_eq!(decode_value("<integer>12px</integer>").unwrap().value, Value::Number(12.0));
        assert_eq!(decode_value("<real>1.5e</real>").unwrap().value, Value::Number(1.5));
        assert_eq!(decode_value("<real>-.25x</real>").unwrap().value, Value::Number(-0.25));
        assert_eq!(decode_value("<real>2e3e4</real>").unwrap().value, Value::Number(2000.0));
        assert_eq!(decode_value("<real>7.</real>").unwrap().value, Value::Number(7.0));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for text in ["nan", "NaN", "inf", "-infinity", "1e999"] {
            let fragment = format!("<real>{}</real>", text);
            assert_eq!(decode_value(&fragment).unwrap().value, Value::Number(0.0), "{}", text);

            let strict = parse_plist_with(
                &wrap(&format!("<key>n</key>{}", fragment)),
                &DecodeOptions::strict(),
            );
            assert!(matches!(strict, Err(PListError::MalformedValue { .. })), "{}", text);
        }
    }

    #[test]
    fn strict_numbers_need_the_whole_text() {
        let result = parse_plist_with(
            &wrap("<key>n</key><integer>12px</integer>"),
            &DecodeOptions::strict(),
        );
        assert!(matches!(result, Err(PListError::MalformedValue { .. })));
    }

    #[test]
    fn lenient_recoveries_are_logged() {
        let (root, warnings) = capture_warnings(|| {
            parse_plist(&wrap(
                "<key>n</key><integer>12px</integer><key>z</key><real>abc</real><key>d</key><date>soon</date><key>orphan</key>",
            ))
        });
        let root = root.unwrap();
        assert_eq!(root.len(), 3);
        assert_eq!(
            warnings,
            vec![
                "reading number '12px' at n as 12".to_string(),
                "unreadable number 'abc' at z, using 0".to_string(),
                "unreadable date 'soon' at d".to_string(),
                "dropping key 'orphan' without a value at root".to_string(),
            ]
        );

        let (_, clean) = capture_warnings(|| parse_plist(&wrap("<key>n</key><integer>1</integer>")));
        assert!(clean.is_empty());
    }

    #[test]
    fn dates_accept_common_forms() {
        let node = decode_value("<date>2024-03-05T06:07:08Z</date>").unwrap();
        let Value::Date(PListDate::Valid(dt)) = &node.value else {
            panic!("expected a valid date");
        };
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 5));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (6, 7, 8));

        let offset = decode_value("<date>2024-03-05T08:07:08+02:00</date>").unwrap();
        assert_eq!(offset.value, node.value);
        let naive = decode_value("<date>2024-03-05T06:07:08</date>").unwrap();
        assert_eq!(naive.value, node.value);
        assert!(matches!(
            decode_value("<date>2024-03-05</date>").unwrap().value,
            Value::Date(PListDate::Valid(_))
        ));
    }

    #[test]
    fn unreadable_date_is_invalid_sentinel() {
        assert_eq!(
            decode_value("<date>yesterday</date>").unwrap().value,
            Value::Date(PListDate::Invalid)
        );
    }

    #[test]
    fn data_ignores_whitespace_and_missing_padding() {
        assert_eq!(
            decode_value("<data>\n\tSGVs\n\tbG8=\n</data>").unwrap().value,
            Value::Data(b"Hello".to_vec())
        );
        assert_eq!(
            decode_value("<data>SGVsbG8</data>").unwrap().value,
            Value::Data(b"Hello".to_vec())
        );
        assert_eq!(decode_value("<data></data>").unwrap().value, Value::Data(Vec::new()));
    }

    #[test]
    fn undecodable_data_fails() {
        assert!(matches!(
            decode_value("<data>@@@</data>"),
            Err(PListError::InvalidData { .. })
        ));
    }

    #[test]
    fn unknown_tag_names_the_tag() {
        match decode_value("<foo/>") {
            Err(PListError::UnknownType { tag, .. }) => assert_eq!(tag, "foo"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unknown_tag_reports_its_path() {
        let err = parse_plist(&wrap("<key>list</key><array><true/><foo/></array>")).unwrap_err();
        assert_eq!(
            err,
            PListError::UnknownType {
                tag: "foo".into(),
                path: "list.[1]".into()
            }
        );
    }

    #[test]
    fn children_receive_ids_before_their_container() {
        let root = parse_plist(&wrap(
            "<key>a</key><array><string>x</string><string>y</string></array><key>b</key><true/>",
        ))
        .unwrap();
        let a = root.get("a").unwrap();
        let Value::Array(items) = &a.value else {
            panic!("expected array");
        };
        assert_eq!(items[0].id, 1);
        assert_eq!(items[1].id, 2);
        assert_eq!(a.id, 3);
        assert_eq!(root.get("b").unwrap().id, 4);
        assert_eq!(root.id, 5);
        assert_eq!(root.allocator.last_issued(), 5);
    }

    #[test]
    fn dict_keys_are_trimmed() {
        let root = parse_plist(&wrap("<key>  spaced\n</key><string>v</string>")).unwrap();
        assert!(root.get("spaced").is_some());
    }

    #[test]
    fn duplicate_keys_overwrite_in_place() {
        let root = parse_plist(&wrap(
            "<key>a</key><integer>1</integer><key>b</key><integer>2</integer><key>a</key><integer>3</integer>",
        ))
        .unwrap();
        let keys: Vec<&str> = root.entries.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(root.get("a").unwrap().value, Value::Number(3.0));
    }

    #[test]
    fn dangling_key_is_dropped_when_lenient() {
        let root = parse_plist(&wrap("<key>a</key><true/><key>orphan</key>")).unwrap();
        assert_eq!(root.len(), 1);
        assert!(root.get("orphan").is_none());
    }

    #[test]
    fn strict_mode_rejects_irregular_input() {
        let strict = DecodeOptions::strict();
        assert!(matches!(
            parse_plist_with(&wrap("<key>n</key><integer>x1</integer>"), &strict),
            Err(PListError::MalformedValue { .. })
        ));
        assert!(matches!(
            parse_plist_with(&wrap("<key>d</key><date>never</date>"), &strict),
            Err(PListError::MalformedValue { .. })
        ));
        assert!(matches!(
            parse_plist_with(&wrap("<key>a</key><true/><key>orphan</key>"), &strict),
            Err(PListError::DanglingKey { .. })
        ));
        assert!(matches!(
            parse_plist_with(&wrap("<key>a</key><true/><key>a</key><false/>"), &strict),
            Err(PListError::DuplicateKey { .. })
        ));
        assert!(matches!(
            parse_plist_with(&wrap("<string>a</string><true/>"), &strict),
            Err(PListError::Format(_))
        ));
    }

    #[test]
    fn strict_mode_accepts_regular_input() {
        let root = parse_plist_with(
            &wrap("<key>n</key><integer>7</integer><key>when</key><date>2020-01-01T00:00:00Z</date>"),
            &DecodeOptions::strict(),
        )
        .unwrap();
        assert_eq!(root.get("n").unwrap().kind(), NodeKind::Number);
        assert_eq!(root.get("when").unwrap().kind(), NodeKind::Date);
    }

    #[test]
    fn line_breaks_are_held_as_newlines() {
        let root = parse_plist(&wrap(
            "<key>a</key><string>one&#13;two</string><key>b</key><string>x&#13;&#10;y</string>",
        ))
        .unwrap();
        assert_eq!(root.get("a").unwrap().value, Value::String("one\ntwo".into()));
        assert_eq!(root.get("b").unwrap().value, Value::String("x\ny".into()));
    }
}
