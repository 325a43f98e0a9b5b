//! Break alert sound.
//!
//! - 休憩開始時に4連ビープを鳴らす
//! - 再生はベストエフォート（失敗してもモード遷移は止めない)
//! - テスト用のカウントするモック実装

pub mod error;
pub mod player;

pub use error::SoundError;
pub use player::{AlertPlayer, MockAlertPlayer, RodioAlertPlayer, BEEP_COUNT, BEEP_INTERVAL};
