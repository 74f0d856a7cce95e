use serde::{Deserialize, Serialize};

/// How the result set is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputEncoding {
    /// A JSON array of flat objects.
    #[default]
    Array,
    /// The JSON array encoded once more as a JSON string, for hosts that expect a string value.
    String,
}

/// Encode records as a JSON array. An empty result is `[]`.
pub fn to_json_array<R: Serialize>(records: &[R]) -> Result<String, serde_json::Error> {
    serde_json::to_string(records)
}

pub fn encode<R: Serialize>(
    records: &[R],
    encoding: OutputEncoding,
) -> Result<String, serde_json::Error> {
    let array = to_json_array(records)?;
    match encoding {
        OutputEncoding::Array => Ok(array),
        OutputEncoding::String => serde_json::to_string(&array),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoist_common::record::BookmarkRecord;

    #[test]
    fn test_empty_is_array() {
        let records: Vec<BookmarkRecord> = vec![];
        assert_eq!(encode(&records, OutputEncoding::Array).unwrap(), "[]");
        assert_eq!(encode(&records, OutputEncoding::String).unwrap(), r#""[]""#);
    }

    #[test]
    fn test_string_encoding_decodes_back() {
        let records = vec![BookmarkRecord {
            name: "Notes \"draft\"".into(),
            address: "file:///notes.md".into(),
        }];
        let outer = encode(&records, OutputEncoding::String).unwrap();
        let inner: String = serde_json::from_str(&outer).unwrap();
        let decoded: Vec<BookmarkRecord> = serde_json::from_str(&inner).unwrap();
        assert_eq!(decoded, records);
    }
}
