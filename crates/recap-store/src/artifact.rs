use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;

/// The finalized recording, ready for persistence.
///
/// Owned by the capture host until handed to the save pipeline; after a save
/// completes the bytes belong to external storage and are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    filename: String,
    bytes: Vec<u8>,
}

impl Artifact {
    /// Wraps assembled bytes under a timestamp-derived filename.
    pub fn new(bytes: Vec<u8>, at: DateTime<Utc>) -> Self {
        Self {
            filename: Self::filename_for(at),
            bytes,
        }
    }

    /// `recording_<date-time>.webm`, with characters a filesystem would
    /// reject (`:`, `.`) replaced and sub-second precision dropped.
    pub fn filename_for(at: DateTime<Utc>) -> String {
        let stamp: String = at
            .to_rfc3339_opts(SecondsFormat::Secs, true)
            .chars()
            .take(19)
            .map(|c| if c == ':' || c == '.' { '-' } else { c })
            .collect();
        format!("recording_{}.webm", stamp)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total byte length of the encoded recording.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn filename_replaces_separators_and_drops_subseconds() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 59).unwrap();
        assert_eq!(
            Artifact::filename_for(at),
            "recording_2024-03-05T14-30-59.webm"
        );
    }

    #[test]
    fn artifact_reports_size() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let artifact = Artifact::new(vec![0u8; 450], at);
        assert_eq!(artifact.size(), 450);
        assert!(artifact.filename().starts_with("recording_"));
        assert!(artifact.filename().ends_with(".webm"));
    }
}
