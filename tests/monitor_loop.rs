use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use sitwell::{
    AlertEvent, AlertSink, BodyLandmarks, CadenceSettings, CameraFrame, FrameSource, Landmark,
    MonitorController, MonitorStatus, PoseEstimator, PostureReport, SessionPhase,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct StaticCamera;

impl FrameSource for StaticCamera {
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<CameraFrame>> {
        Ok(Some(CameraFrame {
            width: 2,
            height: 2,
            pixels: vec![0; 12],
        }))
    }
}

struct BrokenCamera;

impl FrameSource for BrokenCamera {
    fn open(&mut self) -> Result<()> {
        bail!("device busy")
    }

    fn next_frame(&mut self) -> Result<Option<CameraFrame>> {
        Ok(None)
    }
}

struct FixedPose {
    pose: Option<BodyLandmarks>,
}

impl PoseEstimator for FixedPose {
    fn detect(&mut self, _frame: &CameraFrame) -> Result<Option<BodyLandmarks>> {
        Ok(self.pose)
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<AlertEvent>>,
}

impl AlertSink for RecordingSink {
    fn deliver(&self, event: AlertEvent) -> Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

fn side_pose(ear: (f32, f32), shoulder: (f32, f32), hip: (f32, f32)) -> BodyLandmarks {
    BodyLandmarks {
        left_ear: Landmark::new(0.0, 0.0, 0.0),
        right_ear: Landmark::new(ear.0, ear.1, 0.9),
        left_shoulder: Landmark::new(0.0, 0.0, 0.0),
        right_shoulder: Landmark::new(shoulder.0, shoulder.1, 0.9),
        left_hip: Landmark::new(0.0, 0.0, 0.0),
        right_hip: Landmark::new(hip.0, hip.1, 0.9),
    }
}

fn upright_pose() -> BodyLandmarks {
    side_pose((0.5, 0.3), (0.5, 0.5), (0.5, 0.8))
}

fn slouched_pose() -> BodyLandmarks {
    side_pose((0.7, 0.45), (0.5, 0.5), (0.5, 0.8))
}

fn settings(work: u32, brk: u32, alert: u32) -> CadenceSettings {
    CadenceSettings {
        work_minutes: work,
        break_minutes: brk,
        alert_threshold_secs: alert,
    }
}

#[tokio::test]
async fn good_posture_session_records_and_reports() {
    init_logs();
    let sink = Arc::new(RecordingSink::default());
    let controller = MonitorController::new(sink.clone());

    let snapshot = controller
        .start(
            settings(1, 1, 5),
            Box::new(StaticCamera),
            Box::new(FixedPose {
                pose: Some(upright_pose()),
            }),
        )
        .await
        .unwrap();
    assert_eq!(snapshot.status, MonitorStatus::Watching);
    assert_eq!(snapshot.session.phase, SessionPhase::Working);
    assert_eq!(snapshot.session.remaining_secs, 60);

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let snapshot = controller.snapshot().await;
    let reading = snapshot
        .last_reading
        .expect("frames should have been classified by now");
    assert!(reading.verdict.is_good());
    assert!(
        snapshot.session.remaining_secs < 60,
        "session ticker should have counted down"
    );

    match controller.report().await {
        PostureReport::Summary(summary) => {
            assert!(summary.total_samples >= 1);
            assert_eq!(summary.bad_samples, 0);
            assert!((summary.good_percentage - 100.0).abs() < 1e-9);
        }
        other => panic!("expected a summary, got {other:?}"),
    }

    controller.stop().await.unwrap();
    assert_eq!(controller.snapshot().await.status, MonitorStatus::Stopped);
    assert!(controller.stop().await.is_err(), "double stop must fail");

    // Reports keep working on a stopped monitor.
    assert!(!matches!(controller.report().await, PostureReport::NoHistory));
}

#[tokio::test]
async fn sustained_bad_posture_raises_alerts() {
    init_logs();
    let sink = Arc::new(RecordingSink::default());
    let controller = MonitorController::new(sink.clone());

    controller
        .start(
            settings(1, 1, 1),
            Box::new(StaticCamera),
            Box::new(FixedPose {
                pose: Some(slouched_pose()),
            }),
        )
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2500)).await;
    controller.stop().await.unwrap();
    // Let the dispatch queue drain.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let events = sink.events.lock().unwrap();
    let sustained = events
        .iter()
        .filter(|e| **e == AlertEvent::BadPostureSustained)
        .count();
    assert!(
        sustained >= 1,
        "expected at least one sustained-bad alert, got {events:?}"
    );
}

#[tokio::test]
async fn manual_break_counts_and_alerts() {
    init_logs();
    let sink = Arc::new(RecordingSink::default());
    let controller = MonitorController::new(sink.clone());

    assert!(
        controller.take_break().await.is_err(),
        "manual break needs an active session"
    );

    controller
        .start(
            settings(25, 5, 5),
            Box::new(StaticCamera),
            Box::new(FixedPose {
                pose: Some(upright_pose()),
            }),
        )
        .await
        .unwrap();

    assert_eq!(controller.take_break().await.unwrap(), 1);
    assert_eq!(controller.take_break().await.unwrap(), 2);

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.session.breaks_taken, 2);
    assert_eq!(snapshot.session.phase, SessionPhase::Working);

    tokio::time::sleep(Duration::from_millis(200)).await;
    {
        let events = sink.events.lock().unwrap();
        let manual = events
            .iter()
            .filter(|e| **e == AlertEvent::ManualBreakTaken)
            .count();
        assert_eq!(manual, 2);
    }

    controller.stop().await.unwrap();
}

#[tokio::test]
async fn failed_capture_leaves_monitor_idle_and_retryable() {
    init_logs();
    let controller = MonitorController::new(Arc::new(RecordingSink::default()));

    let result = controller
        .start(
            settings(25, 5, 5),
            Box::new(BrokenCamera),
            Box::new(FixedPose { pose: None }),
        )
        .await;
    assert!(result.is_err());
    assert_eq!(controller.snapshot().await.status, MonitorStatus::Idle);

    // Retry with a working device succeeds; absent landmarks are not an
    // error, they just yield no readings.
    controller
        .start(
            settings(25, 5, 5),
            Box::new(StaticCamera),
            Box::new(FixedPose { pose: None }),
        )
        .await
        .unwrap();
    assert_eq!(controller.snapshot().await.status, MonitorStatus::Watching);
    assert!(controller.snapshot().await.last_reading.is_none());

    controller.stop().await.unwrap();
}

#[tokio::test]
async fn rejects_invalid_settings_and_double_start() {
    init_logs();
    let controller = MonitorController::new(Arc::new(RecordingSink::default()));

    let result = controller
        .start(
            settings(0, 5, 5),
            Box::new(StaticCamera),
            Box::new(FixedPose { pose: None }),
        )
        .await;
    assert!(result.is_err(), "out-of-range settings must be rejected");

    controller
        .start(
            settings(1, 1, 5),
            Box::new(StaticCamera),
            Box::new(FixedPose {
                pose: Some(upright_pose()),
            }),
        )
        .await
        .unwrap();

    let second = controller
        .start(
            settings(1, 1, 5),
            Box::new(StaticCamera),
            Box::new(FixedPose {
                pose: Some(upright_pose()),
            }),
        )
        .await;
    assert!(second.is_err(), "second start while active must fail");

    controller.stop().await.unwrap();
}

#[tokio::test]
async fn restart_begins_a_fresh_session() {
    init_logs();
    let controller = MonitorController::new(Arc::new(RecordingSink::default()));

    controller
        .start(
            settings(1, 1, 5),
            Box::new(StaticCamera),
            Box::new(FixedPose {
                pose: Some(upright_pose()),
            }),
        )
        .await
        .unwrap();
    controller.take_break().await.unwrap();
    tokio::time::sleep(Duration::from_millis(1200)).await;
    controller.stop().await.unwrap();

    match controller.report().await {
        PostureReport::Summary(summary) => assert_eq!(summary.breaks_taken, 1),
        other => panic!("expected a summary, got {other:?}"),
    }

    controller
        .start(
            settings(2, 1, 5),
            Box::new(StaticCamera),
            Box::new(FixedPose {
                pose: Some(upright_pose()),
            }),
        )
        .await
        .unwrap();

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.session.breaks_taken, 0);
    assert_eq!(snapshot.session.remaining_secs, 120);

    controller.stop().await.unwrap();
}
