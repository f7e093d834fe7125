use crate::constants::{BALL_DIAMETER, BALL_EDGE_MARGIN, BALL_SPEED, BALL_TRACK_WIDTH};

/// the ball bouncing across the fps panel.
#[derive(Clone, Debug)]
pub struct Ball {
    /// left edge, in track units.
    pub x: f64,
    direction: f64,
    width: f64,
}

impl Ball {
    pub fn new() -> Self {
        Self {
            x: 10.0,
            direction: 1.0,
            width: BALL_TRACK_WIDTH,
        }
    }

    pub fn track_width(&self) -> f64 {
        self.width
    }

    pub fn center(&self) -> f64 {
        self.x + BALL_DIAMETER / 2.0
    }

    /// advances one frame, turning around near either edge.
    pub fn step(&mut self) {
        if self.x + BALL_DIAMETER >= self.width - BALL_EDGE_MARGIN {
            self.direction = -1.0;
        }
        if self.x <= BALL_EDGE_MARGIN {
            self.direction = 1.0;
        }
        self.x += BALL_SPEED * self.direction;
    }
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_right_first() {
        let mut ball = Ball::new();
        ball.step();
        assert_eq!(ball.x, 13.0);
    }

    #[test]
    fn bounces_off_both_edges() {
        let mut ball = Ball::new();
        let mut max_x = ball.x;
        let mut min_after_turn = f64::MAX;
        let mut turned = false;

        for _ in 0..400 {
            let before = ball.x;
            ball.step();
            max_x = max_x.max(ball.x);
            if ball.x < before {
                turned = true;
            }
            if turned {
                min_after_turn = min_after_turn.min(ball.x);
            }
        }

        assert!(turned);
        assert!(max_x + BALL_DIAMETER <= BALL_TRACK_WIDTH);
        assert!(min_after_turn >= 0.0);
        assert!(min_after_turn <= BALL_EDGE_MARGIN);
    }

    #[test]
    fn stays_on_the_track() {
        let mut ball = Ball::new();
        for _ in 0..10_000 {
            ball.step();
            assert!(ball.x >= 0.0);
            assert!(ball.x + BALL_DIAMETER <= ball.track_width());
        }
    }
}
