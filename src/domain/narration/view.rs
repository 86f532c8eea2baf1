//! Narration Context - 控件视图
//!
//! 描述"开始朗读"和"暂停/继续"两个控件应呈现的状态，由调用方负责渲染

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlView {
    /// 开始按钮可用，暂停按钮隐藏
    Idle,
    /// 正在合成首段：开始按钮禁用并显示生成中
    Generating,
    /// 正在加载预渲染音频
    Loading,
    /// 开始按钮隐藏，暂停按钮显示"暂停"
    Playing,
    /// 开始按钮隐藏，暂停按钮显示"继续"
    Paused,
}

impl ControlView {
    pub fn start_visible(&self) -> bool {
        matches!(self, Self::Idle | Self::Generating | Self::Loading)
    }

    pub fn start_enabled(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn start_label(&self) -> &'static str {
        match self {
            Self::Generating => "Generating...",
            Self::Loading => "Loading...",
            _ => "Read to Me",
        }
    }

    pub fn pause_visible(&self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }

    pub fn pause_label(&self) -> &'static str {
        match self {
            Self::Paused => "Resume",
            _ => "Pause",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generating_disables_start() {
        let view = ControlView::Generating;
        assert!(view.start_visible());
        assert!(!view.start_enabled());
        assert!(!view.pause_visible());
        assert_eq!(view.start_label(), "Generating...");
    }

    #[test]
    fn test_paused_shows_resume() {
        assert_eq!(ControlView::Paused.pause_label(), "Resume");
        assert_eq!(ControlView::Playing.pause_label(), "Pause");
        assert!(!ControlView::Playing.start_visible());
    }
}
