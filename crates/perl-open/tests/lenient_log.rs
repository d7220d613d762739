use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};
use perl_open::{open, open_lenient};

struct Collector(Mutex<Vec<(Level, String)>>);

impl Log for Collector {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.0
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static COLLECTOR: Collector = Collector(Mutex::new(Vec::new()));

// Messages logged at `level` that mention `needle`.
fn records(level: Level, needle: &str) -> Vec<String> {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    INSTALLED.get_or_init(|| {
        log::set_logger(&COLLECTOR).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
    COLLECTOR
        .0
        .lock()
        .unwrap()
        .iter()
        .filter(|(l, msg)| *l == level && msg.contains(needle))
        .map(|(_, msg)| msg.clone())
        .collect()
}

#[test]
fn test_lenient_missing_file_logs_error() {
    let path = "/nonexistent/perl-open/lenient-log.txt";
    assert!(records(Level::Error, path).is_empty());

    let handle = open_lenient(&format!("< {path}"));
    assert!(!handle.is_open());

    let errors = records(Level::Error, path);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].starts_with("failed to open"), "{errors:?}");
}

#[test]
fn test_lenient_spawn_failure_logs_error() {
    let program = "perl-open-lenient-no-such-program";
    assert!(records(Level::Error, program).is_empty());

    let handle = open_lenient(&format!("{program} |"));
    assert!(!handle.is_open());

    let errors = records(Level::Error, program);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].starts_with("failed to spawn"), "{errors:?}");
}

#[test]
fn test_typed_open_does_not_log_error() {
    let path = "/nonexistent/perl-open/typed-open.txt";
    assert!(records(Level::Error, path).is_empty());
    assert!(open(path).is_err());
    assert!(records(Level::Error, path).is_empty());
}
