//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Configuration snapshots
//! - Connection -> aggregators -> dispatcher -> sinks
//! - Concurrent connections sharing one static batch
//! - Async byte streams pumped into connections

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::BulkConfig;

    #[test]
    fn test_default_config_survives_toml() {
        let toml = ConfigLoader::to_toml(&BulkConfig::default()).unwrap();
        let parsed = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        assert_eq!(parsed, BulkConfig::default());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::thread;

    use aggregator::StaticAggregator;
    use contracts::{BlockPublisher, BulkConfig};
    use dispatcher::{create_dispatcher, Delivery, Dispatcher, MemorySink, SinkHandle};
    use ingestion::{Batching, Connection, ConnectionOptions};

    struct Harness {
        dispatcher: Arc<Dispatcher>,
        statics: Arc<StaticAggregator>,
        batching: Batching,
        console: Arc<Mutex<Vec<Delivery>>>,
        files: Arc<Mutex<Vec<Delivery>>>,
    }

    impl Harness {
        fn new(threshold: usize, file_workers: usize) -> Self {
            let (console_sink, console) = MemorySink::new("console");
            let (file_sink, files) = MemorySink::new("file");
            let dispatcher = Arc::new(Dispatcher::with_handles(vec![
                SinkHandle::new("console", 1, move |w| console_sink.for_worker(w)),
                SinkHandle::new("file", file_workers, move |w| file_sink.for_worker(w)),
            ]));
            dispatcher.start().unwrap();

            let publisher: Arc<dyn BlockPublisher> = dispatcher.clone();
            let statics = Arc::new(StaticAggregator::new(threshold, publisher.clone()));
            let batching = Batching::new(statics.clone(), publisher);
            Self {
                dispatcher,
                statics,
                batching,
                console,
                files,
            }
        }

        fn connect(&self) -> Connection {
            Connection::open(self.batching.clone(), ConnectionOptions::default())
        }

        fn shutdown(&self) {
            self.statics.flush();
            self.dispatcher.stop();
        }

        fn console(&self) -> Vec<String> {
            MemorySink::deliveries(&self.console)
                .into_iter()
                .map(|d| d.block.to_string())
                .collect()
        }

        fn files(&self) -> Vec<Delivery> {
            MemorySink::deliveries(&self.files)
        }
    }

    /// Single session through the whole pipeline:
    /// static blocks, a nested dynamic block, and the tail flush at EOF
    #[test]
    fn test_e2e_single_connection() {
        let harness = Harness::new(3, 2);
        let connection = harness.connect();

        connection.feed_at(b"cmd1\ncmd2\n{\ncmd3\n{\ncmd4\n}\ncmd5\n}\n", 10);
        connection.feed_at(b"cmd6\ncmd7", 20);
        connection.finish_at(30);
        harness.shutdown();

        assert_eq!(
            harness.console(),
            vec!["cmd1, cmd2", "cmd3, cmd4, cmd5", "cmd6, cmd7"]
        );

        let files = harness.files();
        assert_eq!(files.len(), 3);
        let mut file_blocks: Vec<String> = files.iter().map(|d| d.block.to_string()).collect();
        file_blocks.sort();
        assert_eq!(file_blocks, vec!["cmd1, cmd2", "cmd3, cmd4, cmd5", "cmd6, cmd7"]);
        assert!(files.iter().all(|d| d.worker == 1 || d.worker == 2));
    }

    /// A client that disconnects inside a block loses that block, and only
    /// that block
    #[test]
    fn test_e2e_abandoned_dynamic_block() {
        let harness = Harness::new(2, 1);
        let first = harness.connect();
        let second = harness.connect();

        first.feed_at(b"a\n{\nsecret\n", 1);
        second.feed_at(b"b\n", 2);
        first.finish_at(3);
        second.feed_at(b"c\n", 4);
        second.finish_at(5);
        harness.shutdown();

        assert_eq!(harness.console(), vec!["a", "b, c"]);
        assert!(harness
            .files()
            .iter()
            .all(|d| !d.block.commands().contains(&"secret".to_string())));
    }

    /// Many threads, one connection each, all feeding the shared static
    /// batch: every command is delivered exactly once per sink class
    #[test]
    fn test_e2e_concurrent_connections() {
        const THREADS: usize = 4;
        const COMMANDS: usize = 30;

        let harness = Arc::new(Harness::new(3, 3));
        let workers: Vec<_> = (0..THREADS)
            .map(|t| {
                let harness = Arc::clone(&harness);
                thread::spawn(move || {
                    let connection = harness.connect();
                    for i in 0..COMMANDS {
                        connection.feed(format!("t{t}-{i}\n").as_bytes());
                    }
                    connection.finish();
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        harness.shutdown();

        let mut per_command: HashMap<String, usize> = HashMap::new();
        for delivery in harness.files() {
            assert!(delivery.block.len() <= 3);
            for command in delivery.block.commands() {
                *per_command.entry(command.clone()).or_default() += 1;
            }
        }
        assert_eq!(per_command.len(), THREADS * COMMANDS);
        assert!(per_command.values().all(|&n| n == 1));

        let console_commands: usize = MemorySink::deliveries(&harness.console)
            .iter()
            .map(|d| d.block.len())
            .sum();
        assert_eq!(console_commands, THREADS * COMMANDS);
    }

    /// Config-built dispatcher writing real files
    #[test]
    fn test_e2e_file_sink_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BulkConfig {
            threshold: 2,
            ..Default::default()
        };
        config.console.enabled = false;
        config.file.output_dir = dir.path().join("log");

        let dispatcher = Arc::new(create_dispatcher(&config));
        dispatcher.start().unwrap();
        let publisher: Arc<dyn BlockPublisher> = dispatcher.clone();
        let statics = Arc::new(StaticAggregator::new(
            config.effective_threshold(),
            publisher.clone(),
        ));
        let connection = Connection::open(
            Batching::new(statics.clone(), publisher),
            ConnectionOptions {
                strip_carriage_return: true,
            },
        );

        connection.feed_at(b"x\r\ny\r\nz\r\n", 1_700_000_000);
        connection.finish_at(1_700_000_001);
        statics.flush();
        dispatcher.stop();

        let mut entries: Vec<(String, String)> = std::fs::read_dir(dir.path().join("log"))
            .unwrap()
            .map(|entry| {
                let entry = entry.unwrap();
                let name = entry.file_name().to_string_lossy().into_owned();
                let body = std::fs::read_to_string(entry.path()).unwrap();
                (name, body)
            })
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].1, "x, y\n");
        assert_eq!(entries[1].1, "z\n");
        for (name, _) in &entries {
            assert!(name.starts_with("bulk1700000000_"), "unexpected name {name}");
            assert!(name.ends_with(".log"));
        }
        let totals: u64 = dispatcher.metrics().iter().map(|(_, m)| m.write_count).sum();
        assert_eq!(totals, 2);
    }

    /// Async transport path: two duplex streams pumped concurrently into
    /// their own connections, lines split across writes
    #[tokio::test]
    async fn test_e2e_pumped_streams() {
        use tokio::io::AsyncWriteExt;

        let harness = Arc::new(Harness::new(2, 2));

        let mut readers = Vec::new();
        let mut writers = Vec::new();
        for _ in 0..2 {
            let (writer, reader) = tokio::io::duplex(8);
            writers.push(writer);
            readers.push(reader);
        }

        let pumps: Vec<_> = readers
            .into_iter()
            .map(|reader| {
                let harness = Arc::clone(&harness);
                tokio::spawn(async move {
                    let connection = harness.connect();
                    let bytes = ingestion::pump(reader, &connection).await.unwrap();
                    connection.finish();
                    bytes
                })
            })
            .collect();

        let mut first = writers.remove(0);
        let mut second = writers.remove(0);
        first.write_all(b"{\nal").await.unwrap();
        second.write_all(b"{\nx").await.unwrap();
        first.write_all(b"pha\nbeta\n}\n").await.unwrap();
        second.write_all(b"\ny\n}\n").await.unwrap();
        drop(first);
        drop(second);

        let mut total = 0;
        for pump in pumps {
            total += pump.await.unwrap();
        }
        harness.shutdown();

        assert_eq!(total, 15 + 8);
        let mut console = harness.console();
        console.sort();
        assert_eq!(console, vec!["alpha, beta", "x, y"]);
        assert_eq!(harness.files().len(), 2);
    }
}
