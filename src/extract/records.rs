//! Raw JSON records as they appear in the input files.

use super::ExtractError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// One line of a song-metadata file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SongRecord {
    pub song_id: String,
    pub title: Option<String>,
    pub artist_id: String,
    pub year: Option<i64>,
    pub duration: Option<f64>,
    pub artist_name: Option<String>,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
}

/// One line of an event-log file.
///
/// Only `ts` is mandatory: non-playback events (logins, page views) carry no
/// song, artist or length, and logged-out events carry an empty `userId`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub page: Option<String>,
    pub ts: i64,
    #[serde(default, deserialize_with = "lenient_int")]
    pub user_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
    pub song: Option<String>,
    pub artist: Option<String>,
    pub length: Option<f64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrText {
    Int(i64),
    Text(String),
}

/// Accepts `39`, `"39"`, `""` and `null`; the last two become `None`.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IntOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IntOrText::Int(n)) => Ok(Some(n)),
        Some(IntOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(IntOrText::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected an integer, got {:?}", s))),
    }
}

/// Parses newline-delimited JSON, one object per line. Blank lines are skipped.
pub fn parse_json_lines<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, ExtractError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| ExtractError::Parse {
                line: index + 1,
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_song_record() {
        let line = r#"{"num_songs": 1, "artist_id": "ARD7TVE1187B99BFB1", "artist_latitude": null, "artist_longitude": null, "artist_location": "California - LA", "artist_name": "Casual", "song_id": "SOMZWCG12A8C13C480", "title": "I Didn't Mean To", "duration": 218.93179, "year": 0}"#;
        let record: SongRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.song_id, "SOMZWCG12A8C13C480");
        assert_eq!(record.title.as_deref(), Some("I Didn't Mean To"));
        assert_eq!(record.artist_name.as_deref(), Some("Casual"));
        assert_eq!(record.artist_location.as_deref(), Some("California - LA"));
        assert_eq!(record.artist_latitude, None);
        assert_eq!(record.duration, Some(218.93179));
        assert_eq!(record.year, Some(0));
    }

    #[test]
    fn song_record_without_id_is_rejected() {
        let line = r#"{"title": "x", "artist_id": "A", "duration": 1.0}"#;
        assert!(serde_json::from_str::<SongRecord>(line).is_err());
    }

    #[test]
    fn parses_next_song_event() {
        let line = r#"{"artist":"Pavement","auth":"Logged In","firstName":"Sylvie","gender":"F","itemInSession":0,"lastName":"Cruz","length":99.16036,"level":"free","location":"Washington-Arlington-Alexandria, DC-VA-MD-WV","method":"PUT","page":"NextSong","registration":1540266185796.0,"sessionId":345,"song":"Mercy:The Laundromat","status":200,"ts":1541990258796,"userAgent":"Mozilla\/5.0","userId":"10"}"#;
        let record: LogRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.page.as_deref(), Some("NextSong"));
        assert_eq!(record.ts, 1541990258796);
        assert_eq!(record.user_id, Some(10));
        assert_eq!(record.first_name.as_deref(), Some("Sylvie"));
        assert_eq!(record.session_id, Some(345));
        assert_eq!(record.length, Some(99.16036));
        assert_eq!(record.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn logged_out_event_has_no_user() {
        let line = r#"{"artist":null,"auth":"Logged Out","firstName":null,"gender":null,"lastName":null,"length":null,"level":"free","location":null,"page":"Home","sessionId":52,"song":null,"ts":1541207073796,"userAgent":null,"userId":""}"#;
        let record: LogRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.user_id, None);
        assert_eq!(record.song, None);
        assert_eq!(record.length, None);
    }

    #[test]
    fn non_numeric_user_id_is_rejected() {
        let line = r#"{"page":"NextSong","ts":1,"userId":"abc"}"#;
        assert!(serde_json::from_str::<LogRecord>(line).is_err());
    }

    #[test]
    fn parse_json_lines_reports_line_number() {
        let text = "{\"page\":\"Home\",\"ts\":1}\n\n{\"page\":\"Home\",\"ts\":}\n";
        match parse_json_lines::<LogRecord>(text) {
            Err(ExtractError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn parse_json_lines_skips_blank_lines() {
        let text = "\n{\"page\":\"Home\",\"ts\":1}\n   \n{\"page\":\"NextSong\",\"ts\":2}";
        let records = parse_json_lines::<LogRecord>(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].ts, 2);
    }
}
