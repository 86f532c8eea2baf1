//! 外部播放/合成进程控制
//!
//! 暂停/继续通过 SIGSTOP/SIGCONT 实现，进程原位挂起，恢复后从原位置继续。
//! 进程退出由后台任务等待，结果通过回调交给调用方。
//! 后台任务回收进程后立即清空共享的 PID，之后的挂起/继续直接报错，不会误发信号。

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::process::Command;
use tokio::sync::oneshot;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// 进程结束方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// 正常播放完毕（退出码 0）
    Finished,
    /// 非零退出或等待失败
    Failed(String),
    /// 被 [`ChildProcess::kill`] 终止
    Killed,
}

/// 正在运行的子进程
#[derive(Debug)]
pub struct ChildProcess {
    /// 进程退出或被终止后为 None
    pid: Arc<Mutex<Option<u32>>>,
    kill_tx: Option<oneshot::Sender<()>>,
    suspended: bool,
}

impl ChildProcess {
    /// 启动进程；退出时在后台任务中调用 `on_exit`
    ///
    /// 必须在 tokio 运行时内调用
    pub fn spawn<F>(mut command: Command, on_exit: F) -> io::Result<Self>
    where
        F: FnOnce(ExitOutcome) + Send + 'static,
    {
        let mut child = command
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        let pid = Arc::new(Mutex::new(child.id()));
        let live_pid = pid.clone();
        let (kill_tx, kill_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let status = tokio::select! {
                status = child.wait() => Some(status),
                // 显式 kill 或句柄被丢弃
                _ = kill_rx => None,
            };
            let pid = live_pid.lock().unwrap_or_else(PoisonError::into_inner).take();
            let outcome = match status {
                Some(Ok(status)) if status.success() => ExitOutcome::Finished,
                Some(Ok(status)) => ExitOutcome::Failed(format!("process exited with {}", status)),
                Some(Err(e)) => ExitOutcome::Failed(e.to_string()),
                None => {
                    let _ = child.kill().await;
                    ExitOutcome::Killed
                }
            };
            tracing::debug!(pid = ?pid, outcome = ?outcome, "Child process exited");
            on_exit(outcome);
        });

        Ok(Self {
            pid,
            kill_tx: Some(kill_tx),
            suspended: false,
        })
    }

    pub fn pid(&self) -> Option<u32> {
        *self.pid.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// 挂起进程
    pub fn suspend(&mut self) -> io::Result<()> {
        if !self.suspended {
            self.signal(SignalKind::Stop)?;
            self.suspended = true;
        }
        Ok(())
    }

    /// 从挂起位置继续
    pub fn resume(&mut self) -> io::Result<()> {
        if self.suspended {
            self.signal(SignalKind::Continue)?;
            self.suspended = false;
        }
        Ok(())
    }

    /// 终止进程；重复调用为空操作
    pub fn kill(&mut self) {
        if let Some(tx) = self.kill_tx.take() {
            let _ = tx.send(());
        }
    }

    #[cfg(unix)]
    fn signal(&self, kind: SignalKind) -> io::Result<()> {
        // 持锁发送，退出任务不能在此期间清空 PID
        let guard = self.pid.lock().unwrap_or_else(PoisonError::into_inner);
        let pid = guard
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "child process has exited"))?;
        let signal = match kind {
            SignalKind::Stop => Signal::SIGSTOP,
            SignalKind::Continue => Signal::SIGCONT,
        };
        signal::kill(Pid::from_raw(pid as i32), signal).map_err(io::Error::other)
    }

    #[cfg(not(unix))]
    fn signal(&self, _kind: SignalKind) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "pausing a child process requires a unix platform",
        ))
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        self.kill();
    }
}

#[derive(Debug, Clone, Copy)]
enum SignalKind {
    Stop,
    Continue,
}

/// 可解除的监听器槽位
///
/// 后台退出任务通过它发通知；解除后槽位为空，迟到的通知被丢弃
#[derive(Debug)]
pub struct ListenerSlot<L>(Arc<Mutex<Option<L>>>);

impl<L> Clone for ListenerSlot<L> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<L> ListenerSlot<L> {
    pub fn new(listener: L) -> Self {
        Self(Arc::new(Mutex::new(Some(listener))))
    }

    /// 槽位非空时调用 `f`
    pub fn with(&self, f: impl FnOnce(&L)) {
        let guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(listener) = guard.as_ref() {
            f(listener);
        }
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    pub fn is_attached(&self) -> bool {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}
