//! Full discovery rounds against a fake SSDP responder on loopback

use axis_discover::{Discovery, DiscoveryConfig, AXIS_SERVICE_TYPE};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

const WINDOW: Duration = Duration::from_millis(400);

fn search_reply(service_type: &str, descriptor_port: u16) -> String {
    format!(
        "HTTP/1.1 200 OK\r\n\
         CACHE-CONTROL: max-age=1800\r\n\
         EXT:\r\n\
         LOCATION: http://127.0.0.1:{}/rootdesc1.xml\r\n\
         SERVER: Linux/4.9, UPnP/1.0, Portable SDK for UPnP devices/1.6.22\r\n\
         ST: {}\r\n\
         USN: uuid:Upnp-BasicDevice-1_0-test::{}\r\n\
         \r\n",
        descriptor_port, service_type, service_type
    )
}

fn descriptor(model: &str, serial: &str, url: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/xml\r\n\
         \r\n\
         <?xml version=\"1.0\"?>\n\
         <root xmlns=\"urn:schemas-upnp-org:device-1-0\">\n\
         <device>\n\
         <modelNumber>{}</modelNumber>\n\
         <serialNumber>{}</serialNumber>\n\
         <presentationURL>{}</presentationURL>\n\
         </device>\n\
         </root>\n",
        model, serial, url
    )
}

/// Serves `body` to every connection and counts connections
struct DescriptorServer {
    port: u16,
    connections: Arc<AtomicUsize>,
    _task: JoinHandle<()>,
}

impl DescriptorServer {
    async fn start(body: String) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = connections.clone();

        let task = tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let body = body.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let _ = socket.read_to_end(&mut request).await;
                    let _ = socket.write_all(body.as_bytes()).await;
                });
            }
        });

        Self {
            port,
            connections,
            _task: task,
        }
    }

    fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Answers the first `M-SEARCH` it receives with `replies`
async fn responder(replies: Vec<String>) -> (u16, JoinHandle<String>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();

    let task = tokio::spawn(async move {
        let mut buf = [0u8; 2048];
        let (len, from): (usize, SocketAddr) = socket.recv_from(&mut buf).await.unwrap();
        for reply in replies {
            socket.send_to(reply.as_bytes(), from).await.unwrap();
        }
        String::from_utf8_lossy(&buf[..len]).to_string()
    });

    (port, task)
}

fn loopback_config(port: u16) -> DiscoveryConfig {
    DiscoveryConfig::default()
        .with_target("127.0.0.1")
        .with_port(port)
        .with_window(WINDOW)
        .with_fetch_timeout(Duration::from_secs(2))
}

#[tokio::test]
async fn no_replies_gives_empty_registry() {
    let (port, query) = responder(Vec::new()).await;

    let registry = Discovery::new(loopback_config(port)).run().await.unwrap();
    assert!(registry.is_empty());

    let query = query.await.unwrap();
    assert!(query.starts_with("M-SEARCH * HTTP/1.1\r\n"));
    assert!(query.contains(&format!("ST: {}\r\n", AXIS_SERVICE_TYPE)));
    assert!(query.contains("MAN: \"ssdp:discover\"\r\n"));
}

#[tokio::test]
async fn other_service_type_is_never_fetched() {
    let server = DescriptorServer::start(descriptor("M3045-V", "ACCC8E000001", "http://127.0.0.1/")).await;
    let (port, _query) = responder(vec![search_reply(
        "urn:schemas-upnp-org:device:MediaRenderer:1",
        server.port,
    )])
    .await;

    let registry = Discovery::new(loopback_config(port)).run().await.unwrap();

    assert!(registry.is_empty());
    assert_eq!(server.connections(), 0);
}

#[tokio::test]
async fn devices_are_sorted_and_deduplicated() {
    let camera = DescriptorServer::start(descriptor("Q6075-E", "ACCC8E000002", "http://10.0.0.2:80/")).await;
    let doorbell = DescriptorServer::start(descriptor("I8116-E", "ACCC8E000003", "http://10.0.0.3/")).await;
    let speaker = DescriptorServer::start(descriptor("C1410", "ACCC8E000004", "https://10.0.0.4:443")).await;

    let (port, _query) = responder(vec![
        search_reply(AXIS_SERVICE_TYPE, camera.port),
        "NOTIFY * HTTP/1.1\r\nNTS: ssdp:alive\r\n\r\n".to_string(),
        search_reply(AXIS_SERVICE_TYPE, doorbell.port),
        search_reply(AXIS_SERVICE_TYPE, camera.port),
        search_reply(AXIS_SERVICE_TYPE, speaker.port),
    ])
    .await;

    let registry = Discovery::new(loopback_config(port)).run().await.unwrap();
    let devices: Vec<_> = registry.drain().collect();

    let summary: Vec<_> = devices
        .iter()
        .map(|d| (d.model.as_str(), d.serial.as_str(), d.presentation_url.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("C1410", "ACCC8E000004", "10.0.0.4"),
            ("I8116-E", "ACCC8E000003", "10.0.0.3"),
            ("Q6075-E", "ACCC8E000002", "10.0.0.2"),
        ]
    );

    // The repeated reply for the camera is not fetched a second time.
    assert_eq!(camera.connections(), 1);
    assert_eq!(doorbell.connections(), 1);
}

#[tokio::test]
async fn failing_device_does_not_affect_others() {
    let good = DescriptorServer::start(descriptor("P1435-LE", "ACCC8E000005", "http://10.0.0.5/")).await;
    let broken = DescriptorServer::start("HTTP/1.1 404 Not Found\r\n\r\n".to_string()).await;

    let closed_port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let (port, _query) = responder(vec![
        search_reply(AXIS_SERVICE_TYPE, closed_port),
        search_reply(AXIS_SERVICE_TYPE, broken.port),
        "HTTP/1.1 200 OK\r\nST: urn:axis-com:service:BasicService:1\r\nLOCATION: http://127.0.0.1:abc/x.xml\r\n\r\n"
            .to_string(),
        search_reply(AXIS_SERVICE_TYPE, good.port),
    ])
    .await;

    let registry = Discovery::new(loopback_config(port)).run().await.unwrap();

    assert_eq!(registry.len(), 1);
    assert!(registry.contains("P1435-LE", "ACCC8E000005"));
    assert_eq!(broken.connections(), 1);
}

#[tokio::test]
async fn window_holds_under_constant_traffic() {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();

    let _noise = tokio::spawn(async move {
        let mut buf = [0u8; 2048];
        let (_, from) = socket.recv_from(&mut buf).await.unwrap();
        loop {
            let _ = socket
                .send_to(b"NOTIFY * HTTP/1.1\r\nNTS: ssdp:alive\r\n\r\n", from)
                .await;
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    });

    let started = Instant::now();
    let registry = Discovery::new(loopback_config(port)).run().await.unwrap();

    assert!(registry.is_empty());
    assert!(started.elapsed() < WINDOW * 3, "round took {:?}", started.elapsed());
}

#[tokio::test]
async fn devices_stream_before_round_ends() {
    let camera = DescriptorServer::start(descriptor("M3045-V", "ACCC8E000006", "http://10.0.0.6/")).await;
    let (port, _query) = responder(vec![search_reply(AXIS_SERVICE_TYPE, camera.port)]).await;

    let config = loopback_config(port).with_window(Duration::from_secs(3));
    let started = Instant::now();
    let mut devices = Discovery::new(config).start().await.unwrap();

    let device = devices.recv().await.unwrap();
    assert_eq!(device.serial, "ACCC8E000006");
    assert!(started.elapsed() < Duration::from_secs(3));
}
