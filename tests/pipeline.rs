use std::{
    collections::HashMap,
    io::Write,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use indoc::indoc;
use m3u_squirrel::{Entry, Error, M3uParser, ParserOptions, Playlist, Status};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

const TWO_CHANNELS: &str = indoc! {r#"
    #EXTM3U
    #EXTINF:-1 tvg-id="A.np",Channel A
    http://example.com/a.m3u8
    #EXTINF:-1 tvg-id="B.np",Channel B
    http://example.com/b.m3u8
"#};

const NEPAL: &str = indoc! {r#"
    #EXTM3U
    #EXTINF:-1 tvg-id="CapitalTVHD.np" tvg-country="NP" group-title="News",Capital TV (1080p)
    https://streaming.tvnepal.com:19360/capitaltv/capitaltv.m3u8
    #EXTINF:-1 tvg-id="DivyaDarshanTV.np" tvg-country="np" group-title="Religious",Divya Darshan TV (720p)
    http://live.divyadarshantv.com/hls/stream.m3u8
    #EXTINF:-1 tvg-id="Orphan.np",Orphan without location
    #EXTINF:-1 tvg-id="KantipurTV.np" group-title="News",Kantipur TV
    #EXTVLCOPT:http-user-agent=VLC
    https://ktvhdsg.ekantipur.com:8443/high_quality_85840165/hd/playlist.m3u8
    #EXTINF:-1 tvg-id="Local.np",Local Recording
    /srv/media/recording.mp4
"#};

fn parser(options: ParserOptions) -> M3uParser {
    let countries = HashMap::from([("NP".to_string(), "Nepal".to_string())]);
    M3uParser::with_countries(options, Arc::new(countries))
}

fn titles(playlist: &Playlist) -> Vec<String> {
    playlist
        .entries()
        .iter()
        .filter_map(Entry::title)
        .map(ToString::to_string)
        .collect()
}

/// Serves `200 OK` on one address; the other address refuses connections
async fn live_and_dead_hosts() -> (String, String) {
    let live = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let live_addr = live.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = live.accept().await {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            stream
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
                .await
                .ok();
        }
    });

    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead.local_addr().unwrap();
    drop(dead);

    (
        format!("http://{live_addr}/live.m3u8"),
        format!("http://{dead_addr}/dead.m3u8"),
    )
}

/// Answers every request after a short delay, recording each `User-Agent` and
/// the highest number of requests open at the same time
async fn slow_recording_host() -> (String, Arc<AtomicUsize>, Arc<Mutex<Vec<String>>>) {
    let socket = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let inflight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let agents = Arc::new(Mutex::new(Vec::new()));

    let (peak_out, agents_out) = (peak.clone(), agents.clone());
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = socket.accept().await {
            let (inflight, peak, agents) = (inflight.clone(), peak.clone(), agents.clone());
            tokio::spawn(async move {
                let now = inflight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);

                let mut buf = [0u8; 2048];
                let n = stream.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                if let Some(agent) = request.lines().find_map(|l| {
                    l.to_lowercase()
                        .strip_prefix("user-agent:")
                        .map(|v| v.trim().to_string())
                }) {
                    agents.lock().unwrap().push(agent);
                }

                tokio::time::sleep(Duration::from_millis(100)).await;
                inflight.fetch_sub(1, Ordering::SeqCst);
                stream
                    .write_all(
                        b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                    )
                    .await
                    .ok();
            });
        }
    });

    (format!("http://{addr}"), peak_out, agents_out)
}

#[tokio::test]
async fn test_two_channels_in_order() {
    let playlist = parser(ParserOptions::default())
        .parse(TWO_CHANNELS)
        .await
        .unwrap();

    assert_eq!(titles(&playlist), ["Channel A", "Channel B"]);
    assert!(
        playlist
            .entries()
            .iter()
            .all(|e| e.status == Status::NotChecked)
    );
    assert_eq!(playlist.entries()[0].url, "http://example.com/a.m3u8");
}

#[tokio::test]
async fn test_empty_input_yields_nothing() {
    let playlist = parser(ParserOptions::default()).parse("").await.unwrap();

    assert!(playlist.is_empty());
}

#[tokio::test]
async fn test_non_playlist_text_yields_nothing() {
    let playlist = parser(ParserOptions::default())
        .parse("This is not a valid M3U file\nwith multiple lines\nbut no header")
        .await
        .unwrap();

    assert!(playlist.is_empty());
}

#[tokio::test]
async fn test_only_directives_with_location_become_entries() {
    let playlist = parser(ParserOptions::default()).parse(NEPAL).await.unwrap();

    assert_eq!(
        titles(&playlist),
        [
            "Capital TV (1080p)",
            "Divya Darshan TV (720p)",
            "Kantipur TV",
            "Local Recording"
        ]
    );
    let divya = &playlist.entries()[1];
    let country = divya.country.as_ref().unwrap();
    assert_eq!(country.code, Some(Some("np".to_string())));
    assert_eq!(country.name, Some(Some("Nepal".to_string())));
}

#[tokio::test]
async fn test_missing_file_is_fatal() {
    let err = parser(ParserOptions::default())
        .parse("/no/such/playlist.m3u")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Io { .. }));
}

#[tokio::test]
async fn test_parse_from_file() {
    let mut file = tempfile::Builder::new().suffix(".m3u").tempfile().unwrap();
    file.write_all(NEPAL.as_bytes()).unwrap();

    let playlist = parser(ParserOptions::default())
        .parse(file.path().to_str().unwrap())
        .await
        .unwrap();

    assert_eq!(playlist.len(), 4);
}

#[tokio::test]
async fn test_queries_then_reset() {
    let mut playlist = parser(ParserOptions::default()).parse(NEPAL).await.unwrap();
    let pristine = playlist.clone();

    playlist.filter_by("country-code", &["np"], true);
    assert_eq!(
        titles(&playlist),
        ["Capital TV (1080p)", "Divya Darshan TV (720p)"]
    );

    playlist.sort_by("title", false);
    assert_eq!(
        titles(&playlist),
        ["Divya Darshan TV (720p)", "Capital TV (1080p)"]
    );

    playlist.reset_operations();
    assert_eq!(playlist, pristine);

    playlist.filter_by("country-code", &["US"], true);
    playlist.reset_operations();
    playlist.filter_by("tvg-id", &["us"], true);
    assert!(playlist.is_empty());
}

#[tokio::test]
async fn test_no_country_field_filter_is_empty() {
    let mut playlist = parser(ParserOptions::default())
        .parse(TWO_CHANNELS)
        .await
        .unwrap();
    playlist.filter_by("country-code", &["US"], true);

    assert!(playlist.is_empty());
}

#[tokio::test]
async fn test_enforced_schema_json() {
    let options = ParserOptions {
        enforce_schema: true,
        ..ParserOptions::default()
    };
    let playlist = parser(options).parse(TWO_CHANNELS).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&playlist.to_json().unwrap()).unwrap();

    assert_eq!(
        json[0],
        serde_json::json!({
            "title": "Channel A",
            "logo": null,
            "url": "http://example.com/a.m3u8",
            "category": null,
            "language": null,
            "tvg": { "id": "A.np", "name": null, "url": null },
            "country": { "code": null, "name": null },
            "status": "NOT CHECKED"
        })
    );
}

#[tokio::test]
async fn test_json_export_round_trips() {
    let playlist = parser(ParserOptions::default()).parse(NEPAL).await.unwrap();
    let json = playlist.to_json().unwrap();

    let parsed: Vec<Entry> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, playlist.entries());
}

#[tokio::test]
async fn test_m3u_export_parses_back() {
    let playlist = parser(ParserOptions::default()).parse(NEPAL).await.unwrap();
    let reparsed = parser(ParserOptions::default())
        .parse(&playlist.to_m3u())
        .await
        .unwrap();

    assert_eq!(reparsed.entries(), playlist.entries());
}

#[tokio::test]
async fn test_check_live_marks_status() {
    let (live, dead) = live_and_dead_hosts().await;
    let text = format!(
        "#EXTM3U\n#EXTINF:-1,Live\n{live}\n#EXTINF:-1,Dead\n{dead}\n#EXTINF:-1,File\n/srv/media/clip.mp4\n"
    );
    let options = ParserOptions {
        check_live: true,
        timeout: Duration::from_secs(2),
        parallelism: 2,
        ..ParserOptions::default()
    };

    let mut playlist = parser(options).parse(&text).await.unwrap();
    let statuses = playlist
        .entries()
        .iter()
        .map(|e| e.status)
        .collect::<Vec<Status>>();
    assert_eq!(statuses, [Status::Good, Status::Bad, Status::Good]);

    playlist.filter_by("status", &["GOOD"], true);
    assert_eq!(titles(&playlist), ["Live", "File"]);
}

#[tokio::test]
async fn test_parse_from_url() {
    let socket = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = socket.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = stream.read(&mut buf).await;
        stream
            .write_all(
                format!(
                    "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{TWO_CHANNELS}",
                    TWO_CHANNELS.len()
                )
                .as_bytes(),
            )
            .await
            .ok();
    });

    let playlist = parser(ParserOptions::default())
        .parse(&format!("http://{addr}/list.m3u"))
        .await
        .unwrap();
    assert_eq!(titles(&playlist), ["Channel A", "Channel B"]);
}

#[tokio::test]
async fn test_liveness_checks_send_user_agent_and_respect_parallelism() {
    let (base, peak, agents) = slow_recording_host().await;
    let text = (0..12).fold(String::from("#EXTM3U\n"), |mut acc, i| {
        acc.push_str(&format!("#EXTINF:-1,Channel {i}\n{base}/{i}.m3u8\n"));
        acc
    });
    let options = ParserOptions {
        check_live: true,
        timeout: Duration::from_secs(5),
        parallelism: 3,
        user_agent: "SquirrelTest/1.0".to_string(),
        ..ParserOptions::default()
    };

    let playlist = parser(options).parse_text(&text).await;
    assert_eq!(playlist.len(), 12);
    assert!(playlist.entries().iter().all(|e| e.status == Status::Good));

    let peak = peak.load(Ordering::SeqCst);
    assert!((1..=3).contains(&peak), "peak of {peak} concurrent requests");

    let agents = agents.lock().unwrap();
    assert_eq!(agents.len(), 12);
    assert!(agents.iter().all(|a| a == "squirreltest/1.0"));
}

#[tokio::test]
async fn test_invalid_utf8_file_still_parses() {
    let mut file = tempfile::Builder::new().suffix(".m3u").tempfile().unwrap();
    file.write_all(b"#EXTM3U\n#EXTINF:-1,\xff\nhttp://a.example/a\n")
        .unwrap();

    let playlist = parser(ParserOptions::default())
        .parse(file.path().to_str().unwrap())
        .await
        .unwrap();

    assert_eq!(playlist.len(), 1);
    assert_eq!(playlist.entries()[0].title(), Some("\u{FFFD}"));
    assert_eq!(playlist.entries()[0].url, "http://a.example/a");
}
