//! End-to-end planner tests against the simulated servo bus

use streaker_core::config::{
    JointConfig, JointId, LinkGeometry, MachineConfig, NamedPosition, OperatingMode,
};
use streaker_core::kinematics::{raw_to_degrees_unbounded, select, solve, Point};
use streaker_core::motion::{BarrierOutcome, MotionError, PointOutcome, PolarPlanner};
use streaker_core::pattern::{circle, StreakPattern};
use streaker_drivers::sim::{Fault, SimBus, SimDelay, SimError, SimPort};

type SimPlanner<'a> = PolarPlanner<SimPort<'a>, SimDelay<'a>>;

fn bench_geometry() -> LinkGeometry {
    LinkGeometry::new(99.0, Point::new(70.0, 70.0), 45.0)
}

fn bench_config() -> MachineConfig {
    MachineConfig::new(bench_geometry())
}

fn planner(bus: &SimBus, config: MachineConfig) -> SimPlanner<'_> {
    PolarPlanner::new(bus.port(), bus.delay(), config).unwrap()
}

fn platform_goals(bus: &SimBus) -> heapless::Vec<i32, 256> {
    bus.history()
        .iter()
        .filter(|w| w.joint == JointId::Platform)
        .map(|w| w.raw)
        .collect()
}

#[test]
fn test_end_to_end_point() {
    let config = bench_config();
    let bus = SimBus::from_table(&config.joints);
    let mut planner = planner(&bus, config);

    let outcome = planner.draw_platform_point(30.0, 0.0).unwrap();
    let report = *outcome.report().unwrap();

    assert!(report.barrier.is_settled());
    assert_ne!(report.solution.candidates[0], report.solution.candidates[1]);
    assert_eq!(bus.goal(JointId::PolarArm), report.lever_raw);
    assert_eq!(bus.goal(JointId::Platform), report.platform_raw);

    // The barrier only returns once both joints have arrived
    assert_eq!(bus.position(JointId::PolarArm), report.lever_raw);
    assert_eq!(bus.position(JointId::Platform), report.platform_raw);
    assert!(planner.pose().has_moved_once);
}

#[test]
fn test_move_to_coordinate_alias() {
    let config = bench_config();
    let bus = SimBus::from_table(&config.joints);
    let mut planner = planner(&bus, config);
    assert!(planner.move_to_coordinate(10.0, 10.0).is_ok());
    assert_eq!(bus.goal_writes(JointId::PolarArm), 1);
}

#[test]
fn test_unreachable_point_issues_no_command() {
    let config = MachineConfig::new(LinkGeometry::new(80.0, Point::new(100.0, 0.0), 45.0));
    let bus = SimBus::from_table(&config.joints);
    let mut planner = planner(&bus, config);

    assert_eq!(
        planner.draw_platform_point(0.0, 10.0),
        Err(MotionError::Unreachable)
    );
    assert_eq!(bus.goal_writes(JointId::PolarArm), 0);
    assert_eq!(bus.goal_writes(JointId::Platform), 0);
    assert_eq!(bus.elapsed_ms(), 0);
}

#[test]
fn test_centre_point_is_skipped() {
    let config = bench_config();
    let bus = SimBus::from_table(&config.joints);
    let mut planner = planner(&bus, config);

    assert_eq!(
        planner.draw_platform_point(0.2, 0.3),
        Ok(PointOutcome::Skipped)
    );
    assert!(bus.history().is_empty());
    assert_eq!(bus.elapsed_ms(), 0);
}

#[test]
fn test_platform_crosses_seam_without_jump() {
    // Pick the platform offset so the first target lands at 358 degrees
    let a = Point::new(30.0, 0.0);
    let b = Point::from_polar(30.0, (-4.0f32).to_radians());
    let first = select(None, &solve(&bench_geometry(), a).unwrap().candidates).chosen;
    let offset = 358.0 - first.platform_angle.to_degrees();

    let geometry = bench_geometry().with_home_offsets(0.0, offset);
    let config = MachineConfig::new(geometry);
    let bus = SimBus::from_table(&config.joints);
    let mut planner = planner(&bus, config);

    planner.draw_platform_point(a.x, a.y).unwrap();
    planner.draw_platform_point(b.x, b.y).unwrap();

    let goals = platform_goals(&bus);
    assert_eq!(goals.len(), 2);
    // 358 -> 362 is a 4 degree step (about 46 ticks), not a 356 degree one
    assert!(((goals[1] - goals[0]) - 46).abs() <= 1);
    assert!((planner.pose().last_platform_target_degrees() - 362.0).abs() < 0.1);
    assert!(goals[0] < 0 && goals[1] > 0);
}

#[test]
fn test_circle_keeps_platform_steps_short() {
    let config = bench_config();
    let bus = SimBus::from_table(&config.joints);
    let mut planner = planner(&bus, config);

    // Two full turns
    let report = planner.trace(circle(30.0, 36).chain(circle(30.0, 36))).unwrap();
    assert_eq!(report.moved, 72);
    assert!(report.is_success());

    let goals = platform_goals(&bus);
    assert_eq!(goals.len(), 72);
    for pair in goals.windows(2) {
        assert!((pair[1] - pair[0]).abs() <= 2048, "jump {:?}", pair);
    }
    assert_eq!(goals[71], planner.pose().platform.raw());
}

#[test]
fn test_home_resets_pose() {
    let config = bench_config();
    let bus = SimBus::from_table(&config.joints);
    let mut planner = planner(&bus, config);

    planner.draw_platform_point(20.0, 20.0).unwrap();
    bus.set_position(JointId::Restacker, 4000);

    let outcome = planner.home().unwrap();
    assert_eq!(outcome, BarrierOutcome::Completed);

    for joint in JointId::ALL {
        let home = planner.config().joints.get(joint).unwrap().home_raw;
        assert_eq!(bus.position(joint), home, "{:?}", joint);
    }
    assert!(!planner.pose().has_moved_once);
    assert!(
        (planner.pose().cumulative_platform_degrees() - raw_to_degrees_unbounded(1238)).abs()
            < 1e-3
    );
}

#[test]
fn test_home_timeout() {
    let mut config = bench_config();
    let _ = config.joints.insert(JointConfig::new(
        JointId::LidLifter,
        1,
        OperatingMode::Position,
        3849,
        5,
    ));
    let bus = SimBus::from_table(&config.joints);
    bus.set_position(JointId::LidLifter, 0);
    let mut planner = planner(&bus, config);

    assert_eq!(planner.home(), Err(MotionError::Timeout));
    assert!(bus.elapsed_ms() >= 5000);
}

#[test]
fn test_resync_after_drift() {
    let config = bench_config();
    let bus = SimBus::from_table(&config.joints);
    let mut planner = planner(&bus, config);
    planner.home().unwrap();

    // Platform slipped a full turn plus ten ticks
    bus.set_position(JointId::Platform, 1238 + 4096 + 10);
    let drift = planner.resync_platform().unwrap();

    assert!((drift - raw_to_degrees_unbounded(4096 + 10)).abs() < 1e-2);
    assert!(
        (planner.pose().cumulative_platform_degrees() - raw_to_degrees_unbounded(5344)).abs()
            < 1e-2
    );

    // The next point continues from the measured position
    let report = *planner.draw_platform_point(25.0, 0.0).unwrap().report().unwrap();
    assert!((report.platform_raw - 5344).abs() <= 2048);
}

#[test]
fn test_move_joint_named_position() {
    let config = bench_config();
    let bus = SimBus::from_table(&config.joints);
    let mut planner = planner(&bus, config);

    planner
        .move_joint(JointId::Cartridge2, NamedPosition::Up)
        .unwrap();
    assert_eq!(bus.position(JointId::Cartridge2), 1976);

    assert_eq!(
        planner.move_joint(JointId::LidLifter, NamedPosition::Top),
        Err(MotionError::NoNamedPosition(
            JointId::LidLifter,
            NamedPosition::Top
        ))
    );
}

#[test]
fn test_spiral_pattern_resyncs() {
    let config = bench_config();
    let bus = SimBus::from_table(&config.joints);
    let mut planner = planner(&bus, config);

    let report = planner.run_pattern(StreakPattern::from_id(1)).unwrap();
    assert_eq!(report.total(), 50);
    // Origin plus the two points inside the 1 mm singularity radius
    assert_eq!(report.skipped, 3);
    assert!(report.is_success());

    let measured = raw_to_degrees_unbounded(bus.position(JointId::Platform));
    assert!((planner.pose().cumulative_platform_degrees() - measured).abs() < 1e-2);
}

#[test]
fn test_streak_patterns_complete() {
    for id in [0u8, 2, 3, 9] {
        let config = bench_config();
        let bus = SimBus::from_table(&config.joints);
        let mut planner = planner(&bus, config);

        let pattern = StreakPattern::from_id(id);
        let report = planner.run_pattern(pattern).unwrap();
        assert!(report.is_success(), "pattern {}", id);
        assert_eq!(report.total() as usize, pattern.points().count());
    }
}

#[test]
fn test_trace_continues_past_unreachable() {
    let config = MachineConfig::new(LinkGeometry::new(80.0, Point::new(100.0, 0.0), 45.0));
    let bus = SimBus::from_table(&config.joints);
    let mut planner = planner(&bus, config);

    let points = [
        Point::new(0.0, 10.0),
        Point::new(0.0, 30.0),
        Point::new(5.0, 5.0),
    ];
    let report = planner.trace(points).unwrap();
    assert_eq!(report.unreachable, 2);
    assert_eq!(report.moved, 1);
    assert!(!report.is_success());
}

#[test]
fn test_silent_joints_are_unconfirmed() {
    let config = bench_config();
    let bus = SimBus::from_table(&config.joints);
    bus.set_fault(JointId::PolarArm, Fault::Unresponsive);
    bus.set_fault(JointId::Platform, Fault::Unresponsive);
    let mut planner = planner(&bus, config.clone());

    let report = *planner.draw_platform_point(20.0, 0.0).unwrap().report().unwrap();
    assert_eq!(report.barrier, BarrierOutcome::Unconfirmed);

    let mut strict = self::planner(&bus, config.with_strict_confirmation(true));
    assert_eq!(
        strict.draw_platform_point(20.0, 0.0),
        Err(MotionError::Unconfirmed)
    );
}

#[test]
fn test_bus_error_stops_trace() {
    let config = bench_config();
    let bus = SimBus::from_table(&config.joints);
    let mut planner = planner(&bus, config);

    planner.draw_platform_point(20.0, 0.0).unwrap();
    bus.set_fault(JointId::Platform, Fault::BusError);

    let result = planner.trace(circle(20.0, 8));
    assert_eq!(
        result,
        Err(MotionError::Actuator(SimError::NoResponse(JointId::Platform)))
    );
    assert_eq!(bus.goal_writes(JointId::Platform), 1);
}

#[test]
fn test_home_polls_only_table_joints() {
    let mut joints = streaker_core::config::JointTable::new();
    let _ = joints.insert(JointConfig::new(JointId::PolarArm, 2, OperatingMode::Position, 2042, 100));
    let _ = joints.insert(JointConfig::new(
        JointId::Platform,
        3,
        OperatingMode::ExtendedPosition,
        1238,
        100,
    ));
    let mut config = bench_config();
    config.joints = joints;

    // Joints missing from the table are not on this bus
    let bus = SimBus::from_table(&config.joints);
    for joint in [JointId::LidLifter, JointId::Handler, JointId::Restacker] {
        bus.set_fault(joint, Fault::BusError);
    }
    let mut planner = planner(&bus, config);

    assert_eq!(planner.home(), Ok(BarrierOutcome::Completed));
    assert_eq!(bus.position(JointId::PolarArm), 2042);
    assert_eq!(bus.position(JointId::Platform), 1238);
}

#[test]
fn test_huge_platform_offset_still_moves() {
    let config = MachineConfig::new(bench_geometry().with_home_offsets(0.0, 1.0e12));
    let bus = SimBus::from_table(&config.joints);
    let mut planner = planner(&bus, config);

    let first = *planner.draw_platform_point(30.0, 0.0).unwrap().report().unwrap();
    // The first step is still the shortest way round
    assert!((first.platform_raw - 1238).abs() <= 2048);
    assert!(planner.draw_platform_point(20.0, 10.0).unwrap().report().is_some());
}
