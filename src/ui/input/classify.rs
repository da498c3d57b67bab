use crate::device::{RawSample, SampleKind, REL_Y};
use crate::ui::event::keys::{KEY_DOWN, KEY_MAX, KEY_UP};
use crate::ui::event::TouchPhase;

/// Accumulated trackball travel that turns into one arrow key.
pub const REL_THRESHOLD: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified {
    /// `synthetic` keys come from trackball motion and only ever report key-down.
    Key {
        code: u16,
        down: bool,
        synthetic: bool,
    },
    Touch {
        phase: TouchPhase,
        x: i32,
        y: i32,
    },
}

/// Turns raw samples into key and touch events.
#[derive(Debug, Default)]
pub struct SampleClassifier {
    rel_sum: i32,
    dragging: bool,
}

impl SampleClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, sample: &RawSample) -> Option<Classified> {
        match sample.kind {
            SampleKind::Sync => None,
            SampleKind::Relative => {
                if sample.code != REL_Y {
                    return None;
                }
                self.rel_sum += sample.value;
                let code = if self.rel_sum > REL_THRESHOLD {
                    KEY_DOWN
                } else if self.rel_sum < -REL_THRESHOLD {
                    KEY_UP
                } else {
                    return None;
                };
                self.rel_sum = 0;
                Some(Classified::Key {
                    code,
                    down: true,
                    synthetic: true,
                })
            }
            SampleKind::Absolute => {
                let (x, y) = sample.position();
                let phase = if sample.code == 0 {
                    self.dragging = false;
                    TouchPhase::Release
                } else if self.dragging {
                    TouchPhase::Drag
                } else {
                    self.dragging = true;
                    TouchPhase::Start
                };
                Some(Classified::Touch { phase, x, y })
            }
            SampleKind::Key => {
                self.rel_sum = 0;
                (sample.code <= KEY_MAX).then_some(Classified::Key {
                    code: sample.code,
                    down: sample.value > 0,
                    synthetic: false,
                })
            }
            SampleKind::Other(_) => {
                self.rel_sum = 0;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn rel(value: i32) -> RawSample {
        RawSample::relative(REL_Y, value, Instant::now())
    }

    #[test]
    fn trackball_motion_becomes_arrow_keys() {
        let mut classifier = SampleClassifier::new();
        assert_eq!(classifier.classify(&rel(2)), None);
        assert_eq!(classifier.classify(&rel(1)), None);
        assert_eq!(
            classifier.classify(&rel(1)),
            Some(Classified::Key {
                code: KEY_DOWN,
                down: true,
                synthetic: true
            })
        );
        assert_eq!(classifier.classify(&rel(-3)), None);
        assert_eq!(
            classifier.classify(&rel(-1)),
            Some(Classified::Key {
                code: KEY_UP,
                down: true,
                synthetic: true
            })
        );
    }

    #[test]
    fn other_samples_reset_accumulated_motion() {
        let mut classifier = SampleClassifier::new();
        classifier.classify(&rel(3));
        classifier.classify(&RawSample {
            kind: SampleKind::Other(4),
            code: 4,
            value: 0,
            timestamp: Instant::now(),
        });
        assert_eq!(classifier.classify(&rel(1)), None);
    }

    #[test]
    fn sync_keeps_accumulated_motion() {
        let mut classifier = SampleClassifier::new();
        classifier.classify(&rel(3));
        classifier.classify(&RawSample {
            kind: SampleKind::Sync,
            code: 0,
            value: 0,
            timestamp: Instant::now(),
        });
        assert!(classifier.classify(&rel(1)).is_some());
    }

    #[test]
    fn touch_phases_follow_contact() {
        let mut classifier = SampleClassifier::new();
        let now = Instant::now();
        let phases: Vec<_> = [
            RawSample::touch(10, 20, true, now),
            RawSample::touch(10, 30, true, now),
            RawSample::touch(10, 40, true, now),
            RawSample::touch(10, 40, false, now),
            RawSample::touch(50, 60, true, now),
        ]
        .iter()
        .filter_map(|sample| match classifier.classify(sample) {
            Some(Classified::Touch { phase, .. }) => Some(phase),
            _ => None,
        })
        .collect();
        assert_eq!(
            phases,
            vec![
                TouchPhase::Start,
                TouchPhase::Drag,
                TouchPhase::Drag,
                TouchPhase::Release,
                TouchPhase::Start
            ]
        );
    }

    #[test]
    fn key_codes_past_max_are_dropped() {
        let mut classifier = SampleClassifier::new();
        let sample = RawSample::key(KEY_MAX + 1, true, Instant::now());
        assert_eq!(classifier.classify(&sample), None);
        let release = RawSample::key(KEY_UP, false, Instant::now());
        assert_eq!(
            classifier.classify(&release),
            Some(Classified::Key {
                code: KEY_UP,
                down: false,
                synthetic: false
            })
        );
    }
}
