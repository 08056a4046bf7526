//! Mock-server fixtures shared by the facade tests.

use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use crate::{SheetsClient, types::SheetProperties};

pub(crate) const SPREADSHEET_ID: &str = "abc123";

pub(crate) fn client(server: &MockServer) -> SheetsClient {
    SheetsClient::new("test-token")
        .with_endpoint(&server.uri())
        .unwrap()
}

pub(crate) fn sheet_json(id: i64, title: &str, index: u32, columns: u32, rows: u32) -> Value {
    json!({
        "properties": {
            "sheetId": id,
            "title": title,
            "index": index,
            "sheetType": "GRID",
            "gridProperties": {"rowCount": rows, "columnCount": columns}
        }
    })
}

pub(crate) fn sheet_properties(
    id: i64,
    title: &str,
    index: u32,
    columns: u32,
    rows: u32,
) -> SheetProperties {
    serde_json::from_value(sheet_json(id, title, index, columns, rows)["properties"].clone())
        .unwrap()
}

pub(crate) fn spreadsheet_json(title: &str, sheets: &[Value]) -> Value {
    json!({
        "spreadsheetId": SPREADSHEET_ID,
        "properties": {"title": title},
        "sheets": sheets
    })
}

/// Answers `GET spreadsheets/{id}` with the given sheets, at most `times`
/// times when set.
pub(crate) async fn mount_metadata(
    server: &MockServer,
    title: &str,
    sheets: &[Value],
    times: Option<u64>,
) {
    let mock = Mock::given(method("GET"))
        .and(path(format!("/spreadsheets/{SPREADSHEET_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(spreadsheet_json(title, sheets)));
    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

/// Answers a bulk read of `range` with row-major `values`.
pub(crate) async fn mount_values(server: &MockServer, range: &str, values: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/spreadsheets/{SPREADSHEET_ID}/values/{range}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values
        })))
        .mount(server)
        .await;
}

/// Accepts any batch update, answering with empty replies.
pub(crate) async fn mount_batch_update(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/spreadsheets/{SPREADSHEET_ID}:batchUpdate")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": SPREADSHEET_ID,
            "replies": [{}]
        })))
        .mount(server)
        .await;
}

/// Fails the test if any request other than a GET reaches the server.
pub(crate) async fn forbid_writes(server: &MockServer) {
    for verb in ["POST", "PUT"] {
        Mock::given(method(verb))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(server)
            .await;
    }
}

/// JSON bodies of every request received with the given method.
pub(crate) async fn bodies(server: &MockServer, verb: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.method.as_str() == verb)
        .map(|request| serde_json::from_slice(&request.body).unwrap_or(Value::Null))
        .collect()
}
