//! 可复现随机源
//!
//! 整个仿真只使用一个带种子的随机源，相同种子给出逐字节相同的结果。

use rand::{Rng as _, SeedableRng};
use rand_distr::{Distribution, Exp, Geometric};
use rand_xoshiro::Xoshiro256PlusPlus;

use super::time::SimTime;

#[derive(Debug, Clone)]
pub struct Rng {
    rng: Xoshiro256PlusPlus,
}

impl Rng {
    #[must_use]
    pub fn from_seed(seed: u64) -> Rng {
        Rng {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    pub fn sample<T>(&mut self, dist: &impl Distribution<T>) -> T {
        dist.sample(&mut self.rng)
    }

    /// Exp(rate) 抽样，结果为仿真时间。`rate` 须为正数（构建时已校验）。
    pub fn exp_time(&mut self, rate: f64) -> SimTime {
        match Exp::new(rate) {
            Ok(dist) => SimTime::from_secs_f64(self.sample(&dist)),
            Err(_) => SimTime::ZERO,
        }
    }

    /// 几何分布的试验次数（>= 1），即首次成功所需的伯努利试验数。
    pub fn trials(&mut self, success_p: f64) -> u32 {
        match Geometric::new(success_p) {
            Ok(dist) => {
                let failures: u64 = self.sample(&dist);
                u32::try_from(failures.saturating_add(1)).unwrap_or(u32::MAX)
            }
            Err(_) => 1,
        }
    }

    /// 在 `[0, n)` 中均匀选一个下标；`n` 必须大于 0。
    pub fn index(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }

    /// 在 `[lo, hi]` 中均匀取整数。
    pub fn between(&mut self, lo: u8, hi: u8) -> u8 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    pub fn coin(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }
}
