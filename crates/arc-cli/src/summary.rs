use arc_types::Record;
use serde::Serialize;

/// Per-record view used by `inspect`, as a table row or a JSON object.
#[derive(Debug, Serialize)]
pub struct RecordSummary<'a> {
    pub position: u64,
    pub url: &'a str,
    pub origin_address: &'a str,
    pub timestamp: &'a str,
    pub content_type: &'a str,
    pub declared_length: u64,
    pub payload_length: usize,
    /// `None` when no envelope was found; `-1` for a non-numeric status.
    pub status: Option<i32>,
    pub http_content_type: Option<&'a str>,
    pub body_length: Option<usize>,
    pub anomalies: Vec<&'static str>,
}

impl<'a> RecordSummary<'a> {
    pub fn of(record: &'a Record) -> Self {
        let envelope = record.envelope();
        Self {
            position: record.stream_pos(),
            url: record.url(),
            origin_address: record.origin_address(),
            timestamp: record.timestamp(),
            content_type: record.content_type(),
            declared_length: record.declared_length(),
            payload_length: record.payload_len(),
            status: envelope.map(|e| e.status_code),
            http_content_type: envelope.and_then(|e| e.content_type()),
            body_length: record.body().map(|b| b.len()),
            anomalies: record.anomalies().names().collect(),
        }
    }

    pub fn table_header() -> String {
        format!(
            "{:<6}  {:>10}  {:>9}  {:<24}  {}",
            "STATUS", "POSITION", "BYTES", "TYPE", "URL"
        )
    }

    pub fn table_row(&self) -> String {
        let status = self.status.map_or_else(|| "-".to_string(), |s| s.to_string());
        let mut row = format!(
            "{:<6}  {:>10}  {:>9}  {:<24}  {}",
            status, self.position, self.payload_length, self.content_type, self.url
        );
        if !self.anomalies.is_empty() {
            row.push_str(&format!("  [{}]", self.anomalies.join(",")));
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use arc_types::{Anomalies, RecordHeader};
    use insta::assert_snapshot;

    use super::*;

    fn sample() -> Record {
        let payload = b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\nhi".to_vec();
        let header = RecordHeader::parse(&format!(
            "http://x.test/ 1.2.3.4 20010101000000 text/html {}",
            payload.len()
        ))
        .unwrap();
        let mut record = Record::from_parts(header, payload);
        record.set_stream_pos(91);
        record
    }

    #[test]
    fn table_row() {
        let record = sample();
        let rows = format!(
            "{}\n{}",
            RecordSummary::table_header(),
            RecordSummary::of(&record).table_row()
        );
        assert_snapshot!(rows, @r"
        STATUS    POSITION      BYTES  TYPE                      URL
        200             91         46  text/html                 http://x.test/
        ");
    }

    #[test]
    fn table_row_lists_anomalies() {
        let header = RecordHeader::parse("dns:x.test 1.2.3.4 20010101000000 text/dns 9").unwrap();
        let mut record = Record::from_parts(header, b"1.2.3".to_vec());
        record.flag(Anomalies::SHORT_PAYLOAD);
        record.flag(Anomalies::NON_HTTP_SCHEME);
        assert_snapshot!(RecordSummary::of(&record).table_row(), @"-                0          5  text/dns                  dns:x.test  [short-payload,non-http-scheme]");
    }

    #[test]
    fn json_object() {
        let record = sample();
        let json = serde_json::to_string(&RecordSummary::of(&record)).unwrap();
        assert_snapshot!(json, @r#"{"position":91,"url":"http://x.test/","origin_address":"1.2.3.4","timestamp":"20010101000000","content_type":"text/html","declared_length":46,"payload_length":46,"status":200,"http_content_type":"text/html","body_length":2,"anomalies":[]}"#);
    }
}
