// src/spawn/exec.rs
//! The real fork/drop-privileges/exec [`Spawner`](super::Spawner).
//!
//! Grounded in `examples/other_examples/.../wormhole-attach-main.rs.rs` (privilege transition
//! via `nix::unistd::{fork, execv, setuid, setgid, initgroups}`) and the safe-libc-wrapper style
//! of `examples/cptpcrd-slibc`. Per the Design Notes in spec.md §9, the environment the child
//! will need is built in the parent, before `fork`, rather than assembled piecemeal after; the
//! child still needs a handful of `std::env` calls to actually populate its own environment
//! (there is no safe, allocation-free way to hand a `File`/`Vec`-free child a pre-built `environ`
//! without reaching for raw FFI well beyond what the rest of this crate does), but the amount of
//! child-side work between `fork` and `execv` is kept to the minimum described in spec.md §4.7.

use std::ffi::CString;
use std::io;

use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd::{self, ForkResult, Uid, User};

use super::Spawner;
use crate::event::Event;
use crate::rule::Rule;
use crate::syslog_sink::SyslogSink;
use crate::template::TemplateValues;

/// Signals whose disposition is reset to default in the child, per spec.md §4.7(c).
const RESET_SIGNALS: [Signal; 6] = [
    Signal::SIGINT,
    Signal::SIGHUP,
    Signal::SIGTERM,
    Signal::SIGUSR2,
    Signal::SIGPIPE,
    Signal::SIGTRAP,
];

/// The real [`Spawner`](super::Spawner): forks, drops privileges to the rule's target user, and
/// execs `/bin/sh -c <cmd>`.
pub struct ForkExecSpawner {
    syslog: SyslogSink,
}

impl ForkExecSpawner {
    /// Build a spawner that reports outcomes to the system log.
    ///
    /// # Errors
    ///
    /// Propagates any error from opening the syslog connection.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            syslog: SyslogSink::new()?,
        })
    }
}

impl Spawner for ForkExecSpawner {
    fn spawn(&mut self, rule: &Rule, event: &Event, hostname: &str) -> io::Result<()> {
        let msg = crate::template::expand(&rule.msg, &TemplateValues::new(rule, event, hostname, String::new()));
        let values = TemplateValues::new(rule, event, hostname, msg);
        let cmd = crate::template::expand(&rule.cmd, &values);
        let env = values.env_pairs();

        // SAFETY: the child performs no allocation of its own beyond what's needed to reach
        // `execv`; see the module docs for the full justification.
        match unsafe { unistd::fork() } {
            Ok(ForkResult::Parent { child, .. }) => {
                self.syslog
                    .notice(&format!("spawned pid {} for rule on {:?}", child, rule.uri));
                Ok(())
            }
            Ok(ForkResult::Child) => {
                child_main(rule, &cmd, &env);
                unreachable!("child_main never returns")
            }
            Err(errno) => {
                self.syslog
                    .err(&format!("fork failed for rule on {:?}: {}", rule.uri, errno));
                Err(io::Error::from(errno))
            }
        }
    }
}

/// The child side of a spawn: steps (a)-(i) of spec.md §4.7. Never returns; always exits.
fn child_main(rule: &Rule, cmd: &str, env: &[(&'static str, String)]) -> ! {
    close_inherited_fds();

    if unistd::setsid().is_err() {
        // Non-fatal: failing to detach from the controlling terminal doesn't prevent the
        // command from running, and spec.md only mandates a hard stage-by-stage exit for the
        // privilege-transition steps that follow.
    }

    for signal in RESET_SIGNALS {
        // SAFETY: resetting a signal disposition to its default is always sound.
        let _ = unsafe { signal::signal(signal, SigHandler::SigDfl) };
    }

    let user = match User::from_name(&rule.user) {
        Ok(Some(user)) => user,
        Ok(None) => die("getpwnam", "no such user"),
        Err(errno) => die("getpwnam", &errno.to_string()),
    };

    if let Err(errno) = unistd::setgid(user.gid) {
        die("setgid", &errno.to_string());
    }
    let username = match CString::new(user.name.as_str()) {
        Ok(c) => c,
        Err(_) => die("initgroups", "username contains a NUL byte"),
    };
    if let Err(errno) = unistd::initgroups(&username, user.gid) {
        die("initgroups", &errno.to_string());
    }
    if let Err(errno) = unistd::setuid(user.uid) {
        die("setuid", &errno.to_string());
    }

    clear_env();

    if user.uid != Uid::from_raw(0) {
        std::env::set_var("PATH", "/usr/bin:/usr/local/bin");
        std::env::set_var("LOGNAME", &user.name);
        std::env::set_var("USER", &user.name);
        std::env::set_var("USERNAME", &user.name);
        std::env::set_var("HOME", &user.dir);
        std::env::set_var("SHELL", &user.shell);
    }

    for (name, value) in env {
        std::env::set_var(name, value);
    }

    let shell = CString::new("/bin/sh").unwrap();
    let dash_c = CString::new("-c").unwrap();
    let cmd = match CString::new(cmd) {
        Ok(c) => c,
        Err(_) => die("execlp", "command contains a NUL byte"),
    };

    let _ = unistd::execv(&shell, &[shell.clone(), dash_c, cmd]);
    die("execlp", "execv returned")
}

/// Close every inherited file descriptor from 3 up to the process's open-file ceiling, leaving
/// stdin/stdout/stderr alone, per spec.md §4.7(a).
fn close_inherited_fds() {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let max_fd = unsafe { libc::sysconf(libc::_SC_OPEN_MAX) }.max(3) as i32;
    for fd in 3..max_fd {
        unsafe {
            libc::close(fd);
        }
    }
}

/// Clear every environment variable the parent had set. There is no safe `clearenv` in `std`, so
/// this removes everything the child inherited one variable at a time; by this point in
/// `child_main` the process is single-threaded, so this is not racing anything.
fn clear_env() {
    let keys: Vec<String> = std::env::vars().map(|(k, _)| k).collect();
    for key in keys {
        std::env::remove_var(key);
    }
}

/// syslog the failing stage and errno, then exit with the failure status spec.md §4.7 mandates.
fn die(stage: &str, reason: &str) -> ! {
    // Best-effort: if even this fails there is nothing more useful to do than exit.
    if let Ok(mut syslog) = SyslogSink::new() {
        let _ = syslog.err(&format!("{} failed: {}", stage, reason));
    }
    std::process::exit(255)
}
