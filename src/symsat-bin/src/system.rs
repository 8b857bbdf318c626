/*****************************************************************************************[system.rs]
Copyright (c) 2018-2018, Masaki Hara

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

//! Process timing, for the `--cpu-lim` stop hook and the driver's reports.

use cpu_time::ProcessTime;
use std::time::Instant;

/// Measures process CPU time and wall-clock time from its creation.
#[derive(Debug)]
pub(crate) struct ResourceMeasure {
    cpu_start: ProcessTime,
    wall_start: Instant,
}

impl ResourceMeasure {
    pub(crate) fn new() -> ResourceMeasure {
        ResourceMeasure {
            cpu_start: ProcessTime::now(),
            wall_start: Instant::now(),
        }
    }

    /// Seconds of process CPU time since creation.
    pub fn cpu_time(&self) -> f64 {
        ProcessTime::now().duration_since(self.cpu_start).as_secs_f64()
    }

    /// Seconds of wall-clock time since creation.
    pub fn wall_time(&self) -> f64 {
        self.wall_start.elapsed().as_secs_f64()
    }
}
