//! Full-pipeline behavior against a local socket playing the EDGAR roles:
//! catalog, package index and instance documents, with controllable delays.

use secfacts::core::config::EngineConfig;
use secfacts::edgar::fetch::EdgarError;
use secfacts::edgar::parsing::types::FactValue;
use secfacts::FactEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

struct Route {
    path: &'static str,
    body: &'static str,
    delay_ms: u64,
}

async fn serve_routes(routes: Vec<Route>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();

                let response = match routes.iter().find(|r| request.contains(r.path)) {
                    Some(route) => {
                        if route.delay_ms > 0 {
                            tokio::time::sleep(Duration::from_millis(route.delay_ms)).await;
                        }
                        format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            route.body.len(),
                            route.body
                        )
                    }
                    None => {
                        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                            .to_string()
                    }
                };
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

const CATALOG: &str = r#"{
  "name": "Acme Corp",
  "filings": {
    "recent": {
      "form": ["10-K", "10-K"],
      "filingDate": ["2024-02-10", "2023-02-12"],
      "accessionNumber": ["0001-24-000001", "0001-23-000002"],
      "primaryDocument": ["a_10k.htm", "b_10k.htm"]
    }
  }
}"#;

const INDEX_A: &str = r#"{"directory":{"item":[{"name":"a_10k_htm.xml"}]}}"#;
const INDEX_B: &str = r#"{"directory":{"item":[{"name":"b_10k_htm.xml"}]}}"#;

const INSTANCE_A: &str = r#"<?xml version="1.0"?>
<xbrl xmlns:us-gaap="http://fasb.org/us-gaap/2023">
  <context id="c1"><period><endDate>2023-12-31</endDate></period></context>
  <us-gaap:Revenues contextRef="c1">1,000,000</us-gaap:Revenues>
</xbrl>"#;

fn test_config(addr: SocketAddr) -> EngineConfig {
    EngineConfig {
        use_cache: false,
        max_attempts: 1,
        data_base_url: format!("http://{}", addr),
        archive_base_url: format!("http://{}", addr),
        ..EngineConfig::default()
    }
}

#[tokio::test]
async fn cancellation_keeps_completed_filings_and_drops_stalled_ones() {
    // Filing B's instance document stalls far past the cancellation point;
    // filing A completes well before it.
    let addr = serve_routes(vec![
        Route {
            path: "/submissions/",
            body: CATALOG,
            delay_ms: 0,
        },
        Route {
            path: "000124000001/index.json",
            body: INDEX_A,
            delay_ms: 0,
        },
        Route {
            path: "000123000002/index.json",
            body: INDEX_B,
            delay_ms: 0,
        },
        Route {
            path: "a_10k_htm.xml",
            body: INSTANCE_A,
            delay_ms: 0,
        },
        Route {
            path: "b_10k_htm.xml",
            body: INSTANCE_A,
            delay_ms: 10_000,
        },
    ])
    .await;

    let engine = FactEngine::new(test_config(addr)).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let financials = engine.company_financials(123, &cancel).await.unwrap();

    // The completed filing survives cancellation; the stalled one is dropped.
    assert_eq!(financials.company_name.as_deref(), Some("Acme Corp"));
    assert_eq!(financials.annual.len(), 1);
    assert_eq!(
        financials.annual[0].accession.as_str(),
        "0001-24-000001"
    );
    assert_eq!(
        financials.annual[0].facts["Revenue"].value,
        FactValue::Numeric(1_000_000.0)
    );
    assert!(!financials.none_extractable());
}

#[tokio::test]
async fn cancelling_every_filing_reports_cancelled() {
    let addr = serve_routes(vec![Route {
        path: "/submissions/",
        body: CATALOG,
        delay_ms: 0,
    }])
    .await;

    let engine = FactEngine::new(test_config(addr)).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = engine.company_financials(123, &cancel).await.unwrap_err();
    assert!(matches!(err, EdgarError::Cancelled));
}
