//! # Integration Tests
//!
//! End-to-end tests over the public spooler surface: admission, batching,
//! rotation, flush, and shutdown, always through `Spooler` rather than
//! worker internals.

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use contracts::{BytesSource, Message, MessageSource, SpoolConfig};
    use spooler::Spooler;
    use tempfile::tempdir;

    fn message(bytes: &[u8]) -> Message {
        Box::new(BytesSource::new(bytes.to_vec()))
    }

    fn single_worker_config(root: &Path, temp: &Path, capacity: usize) -> SpoolConfig {
        SpoolConfig::new()
            .workers(1)
            .capacity(capacity)
            .root_dir(root)
            .temp_dir(temp)
            .prefix("e2e_")
    }

    /// Final files in `dir`, ordered by the stamp embedded in the name
    fn read_logs(dir: &Path) -> Vec<Vec<u8>> {
        let mut logs: Vec<(u64, Vec<u8>)> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "log"))
            .map(|p| {
                let name = p.file_stem().unwrap().to_str().unwrap().to_string();
                let (_, stamp) = name.rsplit_once('_').unwrap();
                (stamp.parse().unwrap(), fs::read(&p).unwrap())
            })
            .collect();
        logs.sort_by_key(|(stamp, _)| *stamp);
        logs.into_iter().map(|(_, bytes)| bytes).collect()
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..400 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached within 2s");
    }

    async fn wait_received(spooler: &Spooler, total: u64) {
        wait_until(|| {
            spooler
                .metrics()
                .iter()
                .map(|(_, s)| s.received)
                .sum::<u64>()
                >= total
        })
        .await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_nothing_on_disk_until_flush() {
        let root = tempdir().unwrap();
        let temp = tempdir().unwrap();
        let spooler =
            Spooler::new(single_worker_config(root.path(), temp.path(), 1024)).unwrap();

        assert!(spooler.write(message(b"alpha ")).await);
        assert!(spooler.write(message(b"beta ")).await);
        assert!(spooler.write(message(b"gamma")).await);
        wait_received(&spooler, 3).await;

        assert!(read_logs(root.path()).is_empty());

        spooler.flush().await;
        assert_eq!(read_logs(root.path()), vec![b"alpha beta gamma".to_vec()]);

        spooler.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_exact_capacity_rotates_without_flush() {
        let root = tempdir().unwrap();
        let temp = tempdir().unwrap();
        let spooler = Spooler::new(single_worker_config(root.path(), temp.path(), 8)).unwrap();

        assert!(spooler.write(message(b"12345678")).await);
        wait_until(|| read_logs(root.path()).len() == 1).await;
        assert_eq!(read_logs(root.path()), vec![b"12345678".to_vec()]);

        // the buffer is empty again; a flush must not produce a second file
        spooler.flush().await;
        assert_eq!(read_logs(root.path()).len(), 1);

        spooler.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rotation_driven_by_cumulative_size() {
        let root = tempdir().unwrap();
        let temp = tempdir().unwrap();
        let spooler = Spooler::new(single_worker_config(root.path(), temp.path(), 5)).unwrap();

        // 4 + 6 + 5 bytes at capacity 5: the first file carries the first
        // two messages across two internal swaps, the second carries the
        // third message alone
        assert!(spooler.write(message(b"aaaa")).await);
        assert!(spooler.write(message(b"bbbbbb")).await);
        assert!(spooler.write(message(b"ccccc")).await);

        wait_until(|| read_logs(root.path()).len() == 2).await;
        let logs = read_logs(root.path());
        assert_eq!(logs[0], b"aaaabbbbbb".to_vec());
        assert_eq!(logs[1], b"ccccc".to_vec());

        spooler.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_flush_partial_buffer_exact_bytes() {
        let root = tempdir().unwrap();
        let temp = tempdir().unwrap();
        let spooler =
            Spooler::new(single_worker_config(root.path(), temp.path(), 4096)).unwrap();

        assert!(spooler.write(message(b"partial record")).await);
        wait_received(&spooler, 1).await;
        spooler.flush().await;

        assert_eq!(read_logs(root.path()), vec![b"partial record".to_vec()]);
        spooler.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_shutdown_drains_and_checkpoints() {
        let root = tempdir().unwrap();
        let temp = tempdir().unwrap();
        let spooler =
            Spooler::new(single_worker_config(root.path(), temp.path(), 1024)).unwrap();

        for chunk in [&b"one "[..], &b"two "[..], &b"three"[..]] {
            assert!(spooler.write(message(chunk)).await);
        }
        spooler.shutdown().await;

        assert_eq!(read_logs(root.path()), vec![b"one two three".to_vec()]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_every_accepted_byte_lands_across_workers() {
        let root = tempdir().unwrap();
        let temp = tempdir().unwrap();
        let config = SpoolConfig::new()
            .workers(4)
            .capacity(64)
            .root_dir(root.path())
            .temp_dir(temp.path());
        let spooler = Spooler::new(config).unwrap();

        let mut sent_bytes = 0u64;
        for i in 0..100u32 {
            let record = format!("record-{i:04};");
            sent_bytes += record.len() as u64;
            assert!(spooler.write(message(record.as_bytes())).await);
        }
        wait_received(&spooler, 100).await;
        spooler.flush().await;
        spooler.shutdown().await;

        let total: usize = read_logs(root.path()).iter().map(|l| l.len()).sum();
        assert_eq!(total as u64, sent_bytes);
    }

    /// Source that stalls its worker, plus a close counter
    struct SlowSource {
        delay: Duration,
        closes: Arc<AtomicU64>,
    }

    #[async_trait]
    impl MessageSource for SlowSource {
        async fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            tokio::time::sleep(self.delay).await;
            Ok(0)
        }

        async fn close(&mut self) {
            self.closes.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rejected_message_is_closed_exactly_once() {
        let root = tempdir().unwrap();
        let temp = tempdir().unwrap();
        let config = single_worker_config(root.path(), temp.path(), 64)
            .queue_capacity(1)
            .timeout(Duration::from_millis(100));
        let spooler = Spooler::new(config).unwrap();

        // stall the worker and fill the only slot
        assert!(
            spooler
                .write(Box::new(SlowSource {
                    delay: Duration::from_secs(3),
                    closes: Arc::new(AtomicU64::new(0)),
                }))
                .await
        );
        assert!(spooler.write(message(b"fills the slot")).await);

        let closes = Arc::new(AtomicU64::new(0));
        let rejected = Box::new(SlowSource {
            delay: Duration::ZERO,
            closes: Arc::clone(&closes),
        });
        assert!(!spooler.write(rejected).await);
        assert_eq!(closes.load(Ordering::Relaxed), 1);
        assert_eq!(spooler.rejected(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_config_file_to_running_spooler() {
        let root = tempdir().unwrap();
        let temp = tempdir().unwrap();
        let profile = format!(
            r#"
workers = 1
capacity = 16
prefix = "cfg_"
root_dir = "{}"
temp_dir = "{}"
"#,
            root.path().display(),
            temp.path().display()
        );
        let config_path = temp.path().join("spool.toml");
        fs::write(&config_path, profile).unwrap();

        let config = config_loader::ConfigLoader::load_from_path(&config_path).unwrap();
        assert_eq!(config.prefix, "cfg_");

        let spooler = Spooler::new(config).unwrap();
        assert!(spooler.write(message(b"0123456789abcdef")).await);
        wait_until(|| read_logs(root.path()).len() == 1).await;
        assert_eq!(read_logs(root.path()), vec![b"0123456789abcdef".to_vec()]);
        spooler.shutdown().await;
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "multi_thread")]
    async fn test_final_files_carry_configured_mode() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempdir().unwrap();
        let temp = tempdir().unwrap();
        let config = single_worker_config(root.path(), temp.path(), 4).mode(0o640);
        let spooler = Spooler::new(config).unwrap();

        assert!(spooler.write(message(b"data")).await);
        wait_until(|| read_logs(root.path()).len() == 1).await;

        let entry = fs::read_dir(root.path())
            .unwrap()
            .map(|e| e.unwrap())
            .find(|e| e.path().extension().is_some_and(|ext| ext == "log"))
            .unwrap();
        assert_eq!(entry.metadata().unwrap().permissions().mode() & 0o777, 0o640);

        spooler.shutdown().await;
    }
}
