use std::{cell::RefCell, ffi::OsStr, time::Duration};

#[derive(Clone, Copy)]
struct Env {
    trace_enabled: bool,
    clock_period: Option<Duration>,
}

thread_local! {
    /// Must only be mutated within `set_env`
    static ENV: RefCell<Option<Env>> = const { RefCell::new(None) };
}

pub fn init() {
    let value = Env {
        trace_enabled: var_is("LS8_TRACE", "1"),
        clock_period: var_millis("LS8_CLOCK_MS"),
    };
    set_env(value);
}

/// Print every executed instruction, as with `--trace`.
pub fn is_trace_enabled() -> bool {
    with_env(|env| env.trace_enabled)
}

/// Default tick period for the clocked driver, as with `--clock`.
pub fn clock_period() -> Option<Duration> {
    with_env(|env| env.clock_period)
}

fn set_env(value: Env) {
    ENV.with(|env| {
        let mut env = env.borrow_mut();
        assert!(
            env.is_none(),
            "tried to initialize environment state multiple times"
        );
        *env = Some(value);
    });
}

fn with_env<F, R>(callback: F) -> R
where
    F: Fn(&Env) -> R,
{
    ENV.with(|env| {
        let env = env.borrow();
        let env = env.unwrap_or_else(|| {
            panic!("tried to access environment state before initialization");
        });
        callback(&env)
    })
}

fn var_is(name: impl AsRef<OsStr>, value: impl AsRef<str>) -> bool {
    std::env::var(name.as_ref()).is_ok_and(|v| v == value.as_ref())
}

fn var_millis(name: impl AsRef<OsStr>) -> Option<Duration> {
    let value = std::env::var(name.as_ref()).ok()?;
    parse_millis(&value)
}

fn parse_millis(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_millis)
}
