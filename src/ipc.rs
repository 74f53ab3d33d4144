use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::color::convert;
use crate::device::Device;
use crate::render::{Row, rows};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IpcCommand {
    #[serde(rename = "convert")]
    Convert { kelvin: f64 },
    #[serde(rename = "render")]
    Render { devices: Vec<Device> },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum IpcResponse {
    #[serde(rename = "color")]
    Color {
        kelvin: f64,
        r: u8,
        g: u8,
        b: u8,
        css: String,
    },
    #[serde(rename = "rows")]
    Rows { rows: Vec<Row> },
    #[serde(rename = "error")]
    Error { message: String },
}

pub fn handle_command(line: &str) -> IpcResponse {
    match serde_json::from_str::<IpcCommand>(line.trim()) {
        Ok(IpcCommand::Convert { kelvin }) => {
            let c = convert(kelvin);
            IpcResponse::Color {
                kelvin,
                r: c.r,
                g: c.g,
                b: c.b,
                css: c.css(),
            }
        }
        Ok(IpcCommand::Render { devices }) => {
            debug!(count = devices.len(), "rendering devices");
            IpcResponse::Rows {
                rows: rows(&devices),
            }
        }
        Err(e) => IpcResponse::Error {
            message: format!("Invalid command: {}", e),
        },
    }
}

/// Answer one JSON line per command line until EOF. Blank lines are skipped.
pub async fn serve<R, W>(mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break, // EOF
            Ok(_) => {
                if line.trim().is_empty() {
                    continue;
                }
                let response = handle_command(&line);
                if let IpcResponse::Error { message } = &response {
                    warn!("{message}");
                }
                let response_json = serde_json::to_string(&response)?;
                writer.write_all(response_json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Err(e) => {
                warn!("Error reading command input: {}", e);
                break;
            }
        }
    }
    Ok(())
}

pub async fn handle_stdin_commands() -> Result<()> {
    serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_command() {
        let resp = handle_command(r#"{"type":"convert","kelvin":6600}"#);
        let json = serde_json::to_value(resp).unwrap();
        assert_eq!(json["type"], "color");
        assert_eq!(json["css"], "rgb(255,255,255)");
        assert_eq!(json["r"], 255);
    }

    #[test]
    fn render_command() {
        let resp = handle_command(
            r#"{"type":"render","devices":[{"name":"Lamp","capabilities":["TEMPERATURE"],"temperature":1000}]}"#,
        );
        match resp {
            IpcResponse::Rows { rows } => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].swatch, Some(convert(1000.0)));
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn bad_command_is_an_error_response() {
        let resp = handle_command(r#"{"type":"dance"}"#);
        assert!(matches!(resp, IpcResponse::Error { .. }));
    }

    #[tokio::test]
    async fn serve_answers_each_line() {
        let input = b"{\"type\":\"convert\",\"kelvin\":1000}\n\nnot json\n{\"type\":\"convert\",\"kelvin\":0}\n";
        let mut output = Vec::new();
        serve(&input[..], &mut output).await.unwrap();

        let lines: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["css"], "rgb(255,68,0)");
        assert_eq!(lines[1]["type"], "error");
        assert_eq!(lines[2]["css"], "rgb(255,0,0)");
    }
}
