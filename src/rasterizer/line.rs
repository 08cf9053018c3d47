//! Incremental line stepper
//!
//! Bresenham with an error accumulator, advanced one pixel at a time so the
//! triangle filler can walk two edges in lockstep. A step moves in x, y or
//! both; `descended()` reports whether the last step entered a new row.

/// State of one line walk from a start pixel to a target pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStepper {
    x: i32,
    y: i32,
    start_x: i32,
    start_y: i32,
    target_x: i32,
    target_y: i32,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
    descended: bool,
}

impl LineStepper {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let dx = (x2 - x1).abs();
        let dy = -(y2 - y1).abs();
        Self {
            x: x1,
            y: y1,
            start_x: x1,
            start_y: y1,
            target_x: x2,
            target_y: y2,
            dx,
            dy,
            sx: if x1 < x2 { 1 } else { -1 },
            sy: if y1 < y2 { 1 } else { -1 },
            err: dx + dy,
            done: x1 == x2 && y1 == y2,
            descended: false,
        }
    }

    /// One Bresenham iteration. Reaching the target is only recorded as
    /// `done` by the call after the final step, so the last pixel is still
    /// observable through `position()`.
    pub fn advance(&mut self) {
        self.descended = false;
        if self.done {
            return;
        }
        if self.x == self.target_x && self.y == self.target_y {
            self.done = true;
            return;
        }

        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.y += self.sy;
            self.descended = true;
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// True if the last `advance` moved in y
    pub fn descended(&self) -> bool {
        self.descended
    }

    pub fn clear_descended(&mut self) {
        self.descended = false;
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn target(&self) -> (i32, i32) {
        (self.target_x, self.target_y)
    }

    /// Absolute x extent
    pub fn dx(&self) -> i32 {
        self.dx
    }

    /// Absolute y extent
    pub fn dy(&self) -> i32 {
        -self.dy
    }

    /// Euclidean length of the whole segment
    pub fn length(&self) -> f32 {
        distance(self.start_x, self.start_y, self.target_x, self.target_y)
    }

    /// Euclidean distance from the current pixel to the target
    pub fn remaining(&self) -> f32 {
        distance(self.x, self.y, self.target_x, self.target_y)
    }

    /// Progress along the segment as `1 - remaining / length`; 1 for a
    /// zero-length segment
    pub fn progress(&self) -> f32 {
        let length = self.length();
        if length == 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining() / length).clamp(0.0, 1.0)
    }
}

fn distance(x1: i32, y1: i32, x2: i32, y2: i32) -> f32 {
    let x = x2 as f32 - x1 as f32;
    let y = y2 as f32 - y1 as f32;
    (x * x + y * y).sqrt()
}
