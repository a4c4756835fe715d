//! ポーリングスケジューラー
//!
//! 一定間隔で全エンドポイントをプローブし、結果を集計・出力する。
//!
//! ```text
//! RUNNING ──(サイクル実行 → スナップショット出力 → 待機)──┐
//!    ▲                                                    │
//!    └────────────────────────────────────────────────────┘
//!    │ ShutdownController
//!    ▼
//! STOPPED（最終スナップショットを出力して呼び出し元へ戻る）
//! ```

use crate::common::error::MonitorError;
use crate::probe::ProbeExecutor;
use crate::report::Reporter;
use crate::shutdown::ShutdownController;
use crate::stats::{AvailabilityAggregator, AvailabilitySnapshot};
use crate::types::EndpointSpec;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, info};

/// デフォルトのチェック間隔（秒）
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 15;

/// デフォルトのサイクル内同時プローブ数（1 = 逐次実行）
pub const DEFAULT_MAX_CONCURRENT_PROBES: usize = 1;

/// スケジューラーの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// 監視中
    Running,
    /// 停止済み（終端状態）
    Stopped,
}

/// ポーリングスケジューラー
pub struct PollingScheduler {
    /// 監視対象（設定ファイルの順序）
    endpoints: Vec<EndpointSpec>,
    /// プローブ実行器
    executor: ProbeExecutor,
    /// サイクル間の待機時間
    interval: Duration,
    /// サイクル内の同時プローブ数
    max_concurrent_probes: usize,
    /// 現在の状態
    state: SchedulerState,
    /// 完了したサイクル数
    cycles_completed: u64,
}

impl PollingScheduler {
    /// 新しいスケジューラーを作成
    pub fn new(endpoints: Vec<EndpointSpec>, executor: ProbeExecutor) -> Self {
        Self {
            endpoints,
            executor,
            interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            max_concurrent_probes: DEFAULT_MAX_CONCURRENT_PROBES,
            state: SchedulerState::Running,
            cycles_completed: 0,
        }
    }

    /// チェック間隔を設定
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// サイクル内の同時プローブ数を設定（0は1として扱う）
    pub fn with_concurrency(mut self, max_concurrent_probes: usize) -> Self {
        self.max_concurrent_probes = max_concurrent_probes.max(1);
        self
    }

    /// 現在の状態
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// 完了したサイクル数
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// チェック間隔
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 1サイクル分のプローブを実行して集計する
    ///
    /// 同時実行数が2以上でも、集計とレポート出力は設定ファイルの順序で行う。
    pub async fn run_cycle<R: Reporter>(
        &mut self,
        aggregator: &mut AvailabilityAggregator,
        reporter: &mut R,
    ) -> Result<(), MonitorError> {
        let executor = &self.executor;
        let mut up_count = 0usize;

        {
            let results = stream::iter(self.endpoints.iter())
                .map(|spec| executor.check(spec))
                .buffered(self.max_concurrent_probes);
            futures::pin_mut!(results);

            while let Some(result) = results.next().await {
                aggregator.record(&result.domain, result.up);
                if result.up {
                    up_count += 1;
                }
                reporter.report_probe(&result)?;
            }
        }

        self.cycles_completed += 1;
        debug!(
            cycle = self.cycles_completed,
            probes = self.endpoints.len(),
            up = up_count,
            "Health check cycle completed"
        );
        Ok(())
    }

    /// 停止要求を受けるまで監視ループを実行する
    ///
    /// 停止要求はサイクル開始前と待機中に確認する。実行中のプローブは
    /// 中断せず、各リクエストのタイムアウトに任せる。停止時は最終
    /// スナップショットを出力し、それを返す。
    pub async fn run<R: Reporter>(
        &mut self,
        aggregator: &mut AvailabilityAggregator,
        reporter: &mut R,
        shutdown: &ShutdownController,
    ) -> Result<AvailabilitySnapshot, MonitorError> {
        reporter.report_start()?;

        info!(
            endpoints = self.endpoints.len(),
            interval_secs = self.interval.as_secs_f64(),
            concurrency = self.max_concurrent_probes,
            "Endpoint health monitor started"
        );

        while self.state == SchedulerState::Running {
            if shutdown.is_shutdown_requested() {
                self.state = SchedulerState::Stopped;
                break;
            }

            self.run_cycle(aggregator, reporter).await?;
            reporter.report_snapshot(&aggregator.snapshot())?;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.wait() => {
                    debug!("Shutdown requested during interval sleep");
                    self.state = SchedulerState::Stopped;
                }
            }
        }

        let snapshot = aggregator.snapshot();
        reporter.report_final(&snapshot)?;

        info!(
            cycles = self.cycles_completed,
            domains = snapshot.len(),
            "Endpoint health monitor stopped"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::DomainStats;
    use crate::types::ProbeResult;
    use std::io;
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Start,
        Probe(ProbeResult),
        Snapshot(AvailabilitySnapshot),
        Final(AvailabilitySnapshot),
    }

    #[derive(Clone, Default)]
    struct RecordingReporter {
        events: Arc<Mutex<Vec<Event>>>,
    }

    impl RecordingReporter {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn snapshot_count(&self) -> usize {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| matches!(e, Event::Snapshot(_)))
                .count()
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl Reporter for RecordingReporter {
        fn report_start(&mut self) -> io::Result<()> {
            self.push(Event::Start);
            Ok(())
        }

        fn report_probe(&mut self, result: &ProbeResult) -> io::Result<()> {
            self.push(Event::Probe(result.clone()));
            Ok(())
        }

        fn report_snapshot(&mut self, snapshot: &AvailabilitySnapshot) -> io::Result<()> {
            self.push(Event::Snapshot(snapshot.clone()));
            Ok(())
        }

        fn report_final(&mut self, snapshot: &AvailabilitySnapshot) -> io::Result<()> {
            self.push(Event::Final(snapshot.clone()));
            Ok(())
        }
    }

    struct BrokenReporter;

    impl Reporter for BrokenReporter {
        fn report_start(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn report_probe(&mut self, _result: &ProbeResult) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }

        fn report_snapshot(&mut self, _snapshot: &AvailabilitySnapshot) -> io::Result<()> {
            Ok(())
        }

        fn report_final(&mut self, _snapshot: &AvailabilitySnapshot) -> io::Result<()> {
            Ok(())
        }
    }

    async fn mock_ok(server: &MockServer, route: &str, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_delay(delay))
            .mount(server)
            .await;
    }

    /// 指定回数のスナップショット出力後に停止要求を出す
    async fn stop_after_snapshots(
        reporter: RecordingReporter,
        shutdown: ShutdownController,
        count: usize,
    ) {
        while reporter.snapshot_count() < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        shutdown.request_shutdown();
    }

    #[test]
    fn test_scheduler_defaults() {
        let scheduler = PollingScheduler::new(Vec::new(), ProbeExecutor::new().unwrap());
        assert_eq!(scheduler.interval(), Duration::from_secs(15));
        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert_eq!(scheduler.cycles_completed(), 0);

        let scheduler = scheduler.with_concurrency(0);
        assert_eq!(scheduler.max_concurrent_probes, 1);
    }

    #[tokio::test]
    async fn test_shutdown_before_start_runs_no_cycle() {
        let mut scheduler = PollingScheduler::new(
            vec![EndpointSpec::new("closed", "http://127.0.0.1:1/")],
            ProbeExecutor::new().unwrap(),
        );
        let mut aggregator = AvailabilityAggregator::new();
        let mut reporter = RecordingReporter::default();
        let shutdown = ShutdownController::default();
        shutdown.request_shutdown();

        let snapshot = scheduler
            .run(&mut aggregator, &mut reporter, &shutdown)
            .await
            .unwrap();

        assert!(snapshot.is_empty());
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(scheduler.cycles_completed(), 0);
        assert_eq!(
            reporter.events(),
            vec![Event::Start, Event::Final(AvailabilitySnapshot::default())]
        );
    }

    #[tokio::test]
    async fn test_shutdown_during_sleep_reports_completed_cycles() {
        let server = MockServer::start().await;
        mock_ok(&server, "/health", Duration::ZERO).await;

        let mut scheduler = PollingScheduler::new(
            vec![EndpointSpec::new("health", format!("{}/health", server.uri()))],
            ProbeExecutor::new().unwrap(),
        )
        .with_interval(Duration::from_secs(60));
        let mut aggregator = AvailabilityAggregator::new();
        let mut reporter = RecordingReporter::default();
        let shutdown = ShutdownController::default();

        let trigger = stop_after_snapshots(reporter.clone(), shutdown.clone(), 1);
        let run = scheduler.run(&mut aggregator, &mut reporter, &shutdown);
        let (result, ()) = tokio::time::timeout(Duration::from_secs(10), async {
            tokio::join!(run, trigger)
        })
        .await
        .expect("scheduler did not stop during interval sleep");

        let snapshot = result.unwrap();
        let domain = server.address().to_string();
        assert_eq!(snapshot.get(&domain), Some(100));
        assert_eq!(
            aggregator.stats(&domain),
            Some(DomainStats { total: 1, up: 1 })
        );
        assert_eq!(scheduler.cycles_completed(), 1);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        let events = reporter.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], Event::Start);
        assert!(matches!(&events[1], Event::Probe(p) if p.up && p.endpoint_name == "health"));
        assert!(matches!(events.last(), Some(Event::Final(s)) if s == &snapshot));
    }

    #[tokio::test]
    async fn test_shutdown_mid_cycle_finishes_cycle_then_stops() {
        let server = MockServer::start().await;
        mock_ok(&server, "/a", Duration::from_millis(300)).await;
        mock_ok(&server, "/b", Duration::from_millis(300)).await;

        let mut scheduler = PollingScheduler::new(
            vec![
                EndpointSpec::new("a", format!("{}/a", server.uri())),
                EndpointSpec::new("b", format!("{}/b", server.uri())),
            ],
            ProbeExecutor::new().unwrap(),
        )
        .with_interval(Duration::from_secs(60));
        let mut aggregator = AvailabilityAggregator::new();
        let mut reporter = RecordingReporter::default();
        let shutdown = ShutdownController::default();

        // 1件目のリクエストが応答待ちの間に停止要求を出す
        let trigger = {
            let shutdown = shutdown.clone();
            let server = &server;
            async move {
                while server
                    .received_requests()
                    .await
                    .unwrap_or_default()
                    .is_empty()
                {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                shutdown.request_shutdown();
            }
        };

        let started = std::time::Instant::now();
        let run = scheduler.run(&mut aggregator, &mut reporter, &shutdown);
        let (result, ()) = tokio::time::timeout(Duration::from_secs(10), async {
            tokio::join!(run, trigger)
        })
        .await
        .expect("scheduler did not stop after the cycle");
        let elapsed = started.elapsed();

        let snapshot = result.unwrap();
        assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
        let domain = server.address().to_string();
        assert_eq!(
            aggregator.stats(&domain),
            Some(DomainStats { total: 2, up: 2 })
        );
        assert_eq!(snapshot.get(&domain), Some(100));
        assert_eq!(scheduler.cycles_completed(), 1);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        let events = reporter.events();
        assert_eq!(events.len(), 5);
        assert!(matches!(&events[1], Event::Probe(p) if p.endpoint_name == "a"));
        assert!(matches!(&events[2], Event::Probe(p) if p.endpoint_name == "b"));
        assert_eq!(events[3], Event::Snapshot(snapshot.clone()));
        assert_eq!(events[4], Event::Final(snapshot));
    }

    #[tokio::test]
    async fn test_multiple_cycles_accumulate() {
        let server = MockServer::start().await;
        mock_ok(&server, "/a", Duration::ZERO).await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut scheduler = PollingScheduler::new(
            vec![
                EndpointSpec::new("a", format!("{}/a", server.uri())),
                EndpointSpec::new("b", format!("{}/b", server.uri())),
            ],
            ProbeExecutor::new().unwrap(),
        )
        .with_interval(Duration::from_millis(20));
        let mut aggregator = AvailabilityAggregator::new();
        let mut reporter = RecordingReporter::default();
        let shutdown = ShutdownController::default();

        let trigger = stop_after_snapshots(reporter.clone(), shutdown.clone(), 2);
        let run = scheduler.run(&mut aggregator, &mut reporter, &shutdown);
        let (result, ()) = tokio::time::timeout(Duration::from_secs(10), async {
            tokio::join!(run, trigger)
        })
        .await
        .expect("scheduler did not stop");
        let snapshot = result.unwrap();

        let domain = server.address().to_string();
        let cycles = scheduler.cycles_completed();
        assert!(cycles >= 2);
        assert_eq!(
            aggregator.stats(&domain),
            Some(DomainStats {
                total: cycles * 2,
                up: cycles
            })
        );
        assert_eq!(snapshot.get(&domain), Some(50));
    }

    #[tokio::test]
    async fn test_concurrent_probes_report_in_config_order() {
        let server = MockServer::start().await;
        mock_ok(&server, "/slow", Duration::from_millis(300)).await;
        mock_ok(&server, "/fast", Duration::ZERO).await;
        mock_ok(&server, "/medium", Duration::from_millis(100)).await;

        let mut scheduler = PollingScheduler::new(
            vec![
                EndpointSpec::new("slow", format!("{}/slow", server.uri())),
                EndpointSpec::new("fast", format!("{}/fast", server.uri())),
                EndpointSpec::new("medium", format!("{}/medium", server.uri())),
            ],
            ProbeExecutor::new().unwrap(),
        )
        .with_concurrency(3);
        let mut aggregator = AvailabilityAggregator::new();
        let mut reporter = RecordingReporter::default();

        scheduler
            .run_cycle(&mut aggregator, &mut reporter)
            .await
            .unwrap();

        let names: Vec<_> = reporter
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Probe(p) => Some(p.endpoint_name),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["slow", "fast", "medium"]);
        assert_eq!(
            aggregator.stats(&server.address().to_string()).map(|s| s.total),
            Some(3)
        );
    }

    #[tokio::test]
    async fn test_unsupported_method_counts_as_down() {
        let server = MockServer::start().await;
        mock_ok(&server, "/ok", Duration::ZERO).await;

        let mut scheduler = PollingScheduler::new(
            vec![
                EndpointSpec::new("patch", format!("{}/ok", server.uri())).with_method("PATCH"),
                EndpointSpec::new("ok", format!("{}/ok", server.uri())),
            ],
            ProbeExecutor::new().unwrap(),
        );
        let mut aggregator = AvailabilityAggregator::new();
        let mut reporter = RecordingReporter::default();

        scheduler
            .run_cycle(&mut aggregator, &mut reporter)
            .await
            .unwrap();

        assert_eq!(
            aggregator.stats(&server.address().to_string()),
            Some(DomainStats { total: 2, up: 1 })
        );
        assert_eq!(scheduler.cycles_completed(), 1);
    }

    #[tokio::test]
    async fn test_output_failure_is_fatal() {
        let server = MockServer::start().await;
        mock_ok(&server, "/ok", Duration::ZERO).await;

        let mut scheduler = PollingScheduler::new(
            vec![EndpointSpec::new("ok", format!("{}/ok", server.uri()))],
            ProbeExecutor::new().unwrap(),
        );
        let mut aggregator = AvailabilityAggregator::new();
        let shutdown = ShutdownController::default();

        let err = scheduler
            .run(&mut aggregator, &mut BrokenReporter, &shutdown)
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::Output(_)));
    }
}
