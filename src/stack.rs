use std::hint::black_box;

use crate::error::{Result, SqlprettyError};

/// Default size of the first region a guarded operation runs on.
pub const DEFAULT_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Default ceiling; a request for more than this fails with `StackExhausted`.
pub const DEFAULT_MAX_STACK_SIZE: usize = 1024 * 1024 * 1024;

/// Smallest region the guard accepts.
pub const MIN_STACK_SIZE: usize = 64 * 1024;

const GROWTH_FACTOR: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackDirection {
    Ascending,
    Descending,
}

/// A stack region handed to [`StackSwitch::on_stack`].
#[derive(Debug, PartialEq, Eq)]
pub struct StackRegion {
    size: usize,
}

impl StackRegion {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Capability for running code on a stack other than the caller's.
///
/// The host supplies an implementation; the formatter never assumes a
/// particular mechanism. [`ThreadStack`] is the default.
pub trait StackSwitch: Sync {
    /// Which way the stack grows on this platform.
    fn stack_direction(&self) -> StackDirection;

    /// Approximate address of the current top of stack.
    fn stack_pointer(&self) -> usize;

    /// Run `op` to completion using `region` as its stack.
    fn on_stack(&self, region: &StackRegion, op: &mut (dyn FnMut() + Send)) -> Result<()>;

    /// Release `region` and provide a region of `size` bytes in its place.
    fn replace_stack(&self, region: StackRegion, size: usize) -> Result<StackRegion>;
}

/// Runs each operation on a dedicated scoped thread whose stack is sized to
/// the region. The operating system reserves the memory when the thread
/// starts and frees it when the thread exits.
#[derive(Debug, Clone, Copy)]
pub struct ThreadStack {
    direction: StackDirection,
}

impl ThreadStack {
    pub fn new() -> Self {
        let marker = 0u8;
        let outer = black_box(&marker) as *const u8 as usize;
        Self {
            direction: direction_below(outer),
        }
    }
}

impl Default for ThreadStack {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(never)]
fn direction_below(outer: usize) -> StackDirection {
    let marker = 0u8;
    let inner = black_box(&marker) as *const u8 as usize;
    if inner < outer {
        StackDirection::Descending
    } else {
        StackDirection::Ascending
    }
}

impl StackSwitch for ThreadStack {
    fn stack_direction(&self) -> StackDirection {
        self.direction
    }

    #[inline(never)]
    fn stack_pointer(&self) -> usize {
        let marker = 0u8;
        black_box(&marker) as *const u8 as usize
    }

    fn on_stack(&self, region: &StackRegion, op: &mut (dyn FnMut() + Send)) -> Result<()> {
        std::thread::scope(|scope| {
            let handle = std::thread::Builder::new()
                .name("sqlpretty-stack".into())
                .stack_size(region.size())
                .spawn_scoped(scope, move || op())?;
            match handle.join() {
                Ok(()) => Ok(()),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        })
    }

    fn replace_stack(&self, region: StackRegion, size: usize) -> Result<StackRegion> {
        log::debug!("replacing {} byte stack region with {} bytes", region.size(), size);
        Ok(StackRegion::new(size))
    }
}

/// Measures stack use from the point the guarded operation started.
///
/// Recursive code calls [`StackProbe::check`] on entry; it fails with
/// `StackExhausted` once usage reaches the red zone at the end of the region.
pub struct StackProbe<'a> {
    switch: Option<&'a dyn StackSwitch>,
    direction: StackDirection,
    base: usize,
    budget: usize,
    region_size: usize,
}

impl<'a> StackProbe<'a> {
    pub fn new(switch: &'a dyn StackSwitch, region: &StackRegion) -> Self {
        let size = region.size();
        Self {
            switch: Some(switch),
            direction: switch.stack_direction(),
            base: switch.stack_pointer(),
            // A quarter of the region stays free for unwinding and drop glue.
            budget: size - size / 4,
            region_size: size,
        }
    }

    /// A probe that never fires, for code already running on a stack the
    /// caller trusts.
    pub fn unlimited() -> Self {
        Self {
            switch: None,
            direction: StackDirection::Descending,
            base: 0,
            budget: usize::MAX,
            region_size: usize::MAX,
        }
    }

    /// Bytes of stack used since the probe was created.
    pub fn used(&self) -> usize {
        let Some(switch) = self.switch else {
            return 0;
        };
        let current = switch.stack_pointer();
        match self.direction {
            StackDirection::Descending => self.base.saturating_sub(current),
            StackDirection::Ascending => current.saturating_sub(self.base),
        }
    }

    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.switch.is_some() && self.used() > self.budget {
            return Err(SqlprettyError::StackExhausted {
                limit: self.region_size,
            });
        }
        Ok(())
    }
}

/// Growth policy around a [`StackSwitch`].
///
/// Parsing, document building and drop glue recurse once per nesting level
/// of the input. The guarded operation runs on a region from the switch and
/// checks a [`StackProbe`] at every recursive step. When the probe reports
/// the region nearly used up, the guard asks for a larger region and
/// restarts the operation there.
pub struct StackGuard<'s> {
    switch: &'s dyn StackSwitch,
    initial_size: usize,
    max_size: usize,
}

impl<'s> StackGuard<'s> {
    pub fn new(switch: &'s dyn StackSwitch, initial_size: usize, max_size: usize) -> Result<Self> {
        if initial_size < MIN_STACK_SIZE {
            return Err(SqlprettyError::Config(format!(
                "stack size must be at least {} bytes, got {}",
                MIN_STACK_SIZE, initial_size
            )));
        }
        if max_size < initial_size {
            return Err(SqlprettyError::Config(format!(
                "max stack size {} is smaller than the initial stack size {}",
                max_size, initial_size
            )));
        }
        Ok(Self {
            switch,
            initial_size,
            max_size,
        })
    }

    /// Run `op` on a guarded region, growing the region and restarting `op`
    /// each time it reports `StackExhausted`, until the maximum size is
    /// reached.
    pub fn run<R, F>(&self, op: F) -> Result<R>
    where
        R: Send,
        F: Fn(&StackProbe<'_>) -> Result<R> + Sync,
    {
        let switch = self.switch;
        let mut region = StackRegion::new(self.initial_size);

        loop {
            let mut outcome: Option<Result<R>> = None;
            {
                let region_ref = &region;
                let op_ref = &op;
                let outcome_ref = &mut outcome;
                switch.on_stack(region_ref, &mut || {
                    let probe = StackProbe::new(switch, region_ref);
                    *outcome_ref = Some(op_ref(&probe));
                })?;
            }

            match outcome {
                Some(Err(SqlprettyError::StackExhausted { .. })) => {
                    let size = region.size();
                    if size >= self.max_size {
                        return Err(SqlprettyError::StackExhausted { limit: size });
                    }
                    let next = size.saturating_mul(GROWTH_FACTOR).min(self.max_size);
                    log::warn!(
                        "input nesting exhausted a {} byte stack, retrying with {} bytes",
                        size,
                        next
                    );
                    region = switch.replace_stack(region, next)?;
                }
                Some(result) => return result,
                None => {
                    return Err(SqlprettyError::Io(std::io::Error::other(
                        "stack switch returned without running the operation",
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recurse(probe: &StackProbe<'_>, depth: usize) -> Result<usize> {
        probe.check()?;
        let padding = black_box([0u8; 256]);
        if depth == 0 {
            return Ok(padding[0] as usize);
        }
        Ok(recurse(probe, depth - 1)? + 1)
    }

    #[test]
    fn test_direction_is_descending_on_common_targets() {
        if cfg!(any(target_arch = "x86_64", target_arch = "aarch64")) {
            assert_eq!(
                ThreadStack::new().stack_direction(),
                StackDirection::Descending
            );
        }
    }

    #[test]
    fn test_on_stack_runs_operation() {
        let switch = ThreadStack::new();
        let mut ran = false;
        switch
            .on_stack(&StackRegion::new(MIN_STACK_SIZE * 4), &mut || ran = true)
            .unwrap();
        assert!(ran);
    }

    #[test]
    fn test_probe_tracks_usage() {
        let switch = ThreadStack::new();
        let region = StackRegion::new(DEFAULT_STACK_SIZE);
        let mut observed = 0;
        switch
            .on_stack(&region, &mut || {
                let probe = StackProbe::new(&switch, &region);
                fn deeper(probe: &StackProbe<'_>) -> usize {
                    let pad = black_box([1u8; 1024]);
                    probe.used() + pad[0] as usize
                }
                observed = deeper(&probe);
            })
            .unwrap();
        assert!(observed > 1024, "observed {observed}");
    }

    #[test]
    fn test_unlimited_probe_never_fires() {
        let probe = StackProbe::unlimited();
        assert!(probe.check().is_ok());
        assert_eq!(probe.used(), 0);
    }

    #[test]
    fn test_guard_grows_region_until_operation_fits() {
        let switch = ThreadStack::new();
        let guard = StackGuard::new(&switch, MIN_STACK_SIZE, 256 * 1024 * 1024).unwrap();
        let attempts = AtomicUsize::new(0);
        let depth = guard
            .run(|probe| {
                attempts.fetch_add(1, Ordering::Relaxed);
                recurse(probe, 2_000)
            })
            .unwrap();
        assert_eq!(depth, 2_000);
        assert!(attempts.load(Ordering::Relaxed) > 1);
    }

    #[test]
    fn test_guard_fails_at_ceiling() {
        let switch = ThreadStack::new();
        let guard = StackGuard::new(&switch, MIN_STACK_SIZE, MIN_STACK_SIZE * 4).unwrap();
        let err = guard.run(|probe| recurse(probe, 1_000_000)).unwrap_err();
        assert!(matches!(
            err,
            SqlprettyError::StackExhausted { limit } if limit == MIN_STACK_SIZE * 4
        ));
    }

    #[test]
    fn test_guard_passes_through_other_errors() {
        let switch = ThreadStack::new();
        let guard = StackGuard::new(&switch, DEFAULT_STACK_SIZE, DEFAULT_MAX_STACK_SIZE).unwrap();
        let err = guard
            .run(|_| -> Result<()> { Err(SqlprettyError::Config("nope".into())) })
            .unwrap_err();
        assert!(matches!(err, SqlprettyError::Config(_)));
    }

    #[test]
    fn test_guard_rejects_bad_sizes() {
        let switch = ThreadStack::new();
        assert!(StackGuard::new(&switch, 1024, DEFAULT_MAX_STACK_SIZE).is_err());
        assert!(StackGuard::new(&switch, DEFAULT_STACK_SIZE, MIN_STACK_SIZE).is_err());
    }
}
