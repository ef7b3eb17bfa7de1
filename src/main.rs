//! Replays a synthetic hand answering a task.
//!
//! Usage: `airsketch [ANSWER]`, where `ANSWER` is a finger count or a shape name (default:
//! `circle`). The hand always traces a circle, so other shapes are answered with "try again".

use std::{
    env,
    f32::consts::TAU,
    time::{Duration, Instant},
};

use airsketch::{
    geometry::point,
    landmark::HandFrame,
    scheduler::{FrameSource, HandDetector, Sampler, Scheduler},
    session::{Event, Session},
    stroke::Surface,
    synth::HandPose,
    task::Answer,
};

/// Number of frames it takes the synthetic hand to trace a circle.
const CIRCLE_FRAMES: usize = 100;

struct Camera;

impl FrameSource for Camera {
    type Frame = ();

    fn latest_frame(&mut self) -> Option<()> {
        Some(())
    }
}

struct Puppet {
    answer: Answer,
    frame: usize,
}

impl HandDetector for Puppet {
    type Frame = ();

    fn detect(&mut self, _: &(), _timestamp: Duration) -> anyhow::Result<Option<HandFrame>> {
        let i = self.frame;
        self.frame += 1;
        let pose = match self.answer {
            Answer::Fingers(n) => HandPose::new().fingers(n),
            Answer::Shape(_) if i <= CIRCLE_FRAMES => {
                let angle = TAU * i as f32 / CIRCLE_FRAMES as f32;
                HandPose::drawing_at(point(0.5 + 0.3 * angle.cos(), 0.5 + 0.3 * angle.sin()))
            }
            // Lower the hand once the stroke is finished.
            Answer::Shape(_) => return Ok(None),
        };
        Ok(Some(pose.build()))
    }
}

fn main() -> anyhow::Result<()> {
    airsketch::init_logger!();

    let answer = env::args()
        .nth(1)
        .as_deref()
        .unwrap_or("circle")
        .parse::<Answer>()?;

    let sampler = Sampler::new(Camera, Puppet { answer, frame: 0 });
    let mut scheduler = Scheduler::spawn(sampler, Session::new(Surface::new(640.0, 480.0)))?;
    scheduler.set_task(Some(answer));

    let give_up = Instant::now() + Duration::from_secs(30);
    let mut samples = 0;
    while let Ok(event) = scheduler.events().recv_deadline(give_up) {
        match event {
            Event::Sample(_) => samples += 1,
            Event::StrokeDiscarded { points } => {
                log::info!("stroke with {points} points discarded")
            }
            Event::ShapeDetected { shape, points } => {
                log::info!("detected {shape} ({points} points)")
            }
            Event::Verdict(verdict) => {
                log::info!("{verdict:?} after {samples} samples");
                break;
            }
        }
    }

    scheduler.stop();
    Ok(())
}
