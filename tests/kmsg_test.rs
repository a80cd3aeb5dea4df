//! kmsg parsing, OOM classification and the background reader.

use oom_notifier::kmsg::{extract_pid, is_oom_kill, parse_line, KmsgEntry, KmsgReader, QUEUE_CAPACITY};
use oom_notifier::KmsgError;
use std::io::{Cursor, Write};
use std::time::{Duration, Instant};

fn entry(message: &str) -> KmsgEntry {
    KmsgEntry {
        priority: 3,
        sequence: 1,
        timestamp: 1,
        message: message.to_string(),
    }
}

/// Drain until `want` entries arrived or the deadline passes.
fn drain_until(reader: &mut KmsgReader, want: usize) -> Vec<KmsgEntry> {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut out = Vec::new();
    while out.len() < want && Instant::now() < deadline {
        out.extend(reader.drain_available());
        std::thread::sleep(Duration::from_millis(5));
    }
    out
}

#[test]
fn parse_well_formed_line() {
    let e = parse_line("6,1234,5678901;hello world").unwrap();
    assert_eq!(
        e,
        KmsgEntry {
            priority: 6,
            sequence: 1234,
            timestamp: 5678901,
            message: "hello world".to_string(),
        }
    );
}

#[test]
fn parse_keeps_flags_out_of_timestamp_and_semicolons_in_message() {
    let e = parse_line("3,551,987654321,-;Out of memory; really;").unwrap();
    assert_eq!(e.timestamp, 987654321);
    assert_eq!(e.message, "Out of memory; really;");

    let e = parse_line("-1,0,0,c,extra;").unwrap();
    assert_eq!(e.priority, -1);
    assert_eq!(e.message, "");
}

#[test]
fn parse_rejects_malformed_lines() {
    assert!(matches!(
        parse_line("6,1,2 no separator"),
        Err(KmsgError::MalformedEntry { .. })
    ));
    assert!(matches!(parse_line("6,1;msg"), Err(KmsgError::MalformedEntry { .. })));
    assert!(matches!(
        parse_line(" SUBSYSTEM=pci"),
        Err(KmsgError::MalformedEntry { .. })
    ));
}

#[test]
fn parse_rejects_non_numeric_fields() {
    for (line, field) in [
        ("x,1,2;m", "priority"),
        ("6,-1,2;m", "sequence"),
        ("6,1,abc;m", "timestamp"),
        ("6,1,18446744073709551616;m", "timestamp"),
    ] {
        match parse_line(line) {
            Err(KmsgError::InvalidField { field: f, .. }) => assert_eq!(f, field, "{line}"),
            other => panic!("{line}: unexpected {other:?}"),
        }
    }
}

#[test]
fn oom_classification_is_case_insensitive() {
    for msg in [
        "Out Of Memory: killed process 1234 (foo)",
        "OUT OF MEMORY: Killed Process 1234 (foo)",
    ] {
        assert!(is_oom_kill(&entry(msg)));
        assert_eq!(extract_pid(msg).unwrap(), 1234);
    }
    assert!(is_oom_kill(&entry("Memory cgroup out of memory: Killed process 9 (x)")));
    assert!(!is_oom_kill(&entry("oom-kill:constraint=CONSTRAINT_NONE")));
    assert!(!is_oom_kill(&entry("out of memory without colon")));
}

#[test]
fn extract_pid_failures() {
    assert!(matches!(
        extract_pid("Out of memory: nothing to see"),
        Err(KmsgError::NoPidFound)
    ));
    assert!(matches!(
        extract_pid("Out of memory: Killed process abc (x)"),
        Err(KmsgError::NoPidFound)
    ));
    assert!(matches!(
        extract_pid("Out of memory: Killed process 99999999999 (x)"),
        Err(KmsgError::PidOverflow { .. })
    ));
    assert!(matches!(
        extract_pid("Out of memory: Killed process 12ab (x)"),
        Err(KmsgError::NoPidFound)
    ));
}

#[test]
fn reader_skips_bad_lines_and_preserves_order() {
    let input = "6,1,100;first\nnot a kmsg line\n6,2,200;second\n\n6,x,300;bad seq\n6,3,300;third\n";
    let mut reader = KmsgReader::from_reader(Cursor::new(input.as_bytes().to_vec())).unwrap();
    let got = drain_until(&mut reader, 3);
    let messages: Vec<&str> = got.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, ["first", "second", "third"]);
}

#[test]
fn reader_tolerates_invalid_utf8() {
    let mut input = b"6,1,100;caf\xff\n".to_vec();
    input.extend_from_slice(b"6,2,200;ok\n");
    let mut reader = KmsgReader::from_reader(Cursor::new(input)).unwrap();
    let got = drain_until(&mut reader, 2);
    assert_eq!(got.len(), 2);
    assert_eq!(got[1].message, "ok");
}

#[test]
fn drain_never_blocks_when_empty() {
    let mut reader = KmsgReader::from_reader(Cursor::new(Vec::new())).unwrap();
    let start = Instant::now();
    assert!(reader.drain_available().is_empty());
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn bounded_queue_never_loses_entries_under_slow_consumer() {
    let total = QUEUE_CAPACITY * 5;
    let input: String = (0..total).map(|i| format!("6,{i},{i};line {i}\n")).collect();
    let mut reader = KmsgReader::from_reader(Cursor::new(input.into_bytes())).unwrap();

    // Let the producer fill the queue before the first drain.
    std::thread::sleep(Duration::from_millis(100));

    let deadline = Instant::now() + Duration::from_secs(20);
    let mut seen = Vec::new();
    while seen.len() < total && Instant::now() < deadline {
        let batch = reader.drain_available();
        assert!(batch.len() <= QUEUE_CAPACITY);
        seen.extend(batch);
        std::thread::sleep(Duration::from_millis(10));
    }

    assert_eq!(seen.len(), total);
    for (i, e) in seen.iter().enumerate() {
        assert_eq!(e.sequence, i as u64);
    }
}

#[test]
fn open_skips_existing_backlog() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "3,1,10;Out of memory: Killed process 1 (old)").unwrap();
    file.flush().unwrap();

    let mut reader = KmsgReader::open(file.path()).unwrap();
    std::thread::sleep(Duration::from_millis(100));
    assert!(reader.drain_available().is_empty());
    reader.close();
}

#[test]
fn open_missing_device_fails() {
    let err = KmsgReader::open(std::path::Path::new("/nonexistent/kmsg")).err().unwrap();
    assert!(matches!(err, KmsgError::Open { .. }));
}

#[test]
fn close_releases_producer_blocked_on_full_queue() {
    let input: String = (0..QUEUE_CAPACITY * 3).map(|i| format!("6,{i},{i};x\n")).collect();
    let mut reader = KmsgReader::from_reader(Cursor::new(input.into_bytes())).unwrap();

    // The queue fills and the producer parks in its send.
    std::thread::sleep(Duration::from_millis(200));
    assert!(reader.is_running());

    reader.close();
    let deadline = Instant::now() + Duration::from_secs(5);
    while reader.is_running() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(!reader.is_running(), "ingestion thread still running after close");
    // Only what was queued before close is handed out; nothing new arrives.
    assert!(reader.drain_available().len() <= QUEUE_CAPACITY);
    assert!(reader.drain_available().is_empty());
}

#[test]
fn ingestion_thread_finishes_at_end_of_stream() {
    let mut reader = KmsgReader::from_reader(Cursor::new(b"6,1,1;only\n".to_vec())).unwrap();
    let got = drain_until(&mut reader, 1);
    assert_eq!(got.len(), 1);
    let deadline = Instant::now() + Duration::from_secs(5);
    while reader.is_running() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(!reader.is_running());
}
