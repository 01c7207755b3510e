// src/generate/mode.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output format requested for a generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    ShortVideo,
    Article,
    SocialPost,
    Commentator,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::ShortVideo,
        Mode::Article,
        Mode::SocialPost,
        Mode::Commentator,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Mode::ShortVideo => "short_video",
            Mode::Article => "article",
            Mode::SocialPost => "social_post",
            Mode::Commentator => "commentator",
        }
    }

    /// Label shown in the page and substituted as the prompt's purpose.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::ShortVideo => "YouTubeショート/TikTok用",
            Mode::Article => "ブログ/ニュース記事用",
            Mode::SocialPost => "SNS投稿用",
            Mode::Commentator => "辛口コメンテーター風",
        }
    }

    /// Conditions appended after the shared ones.
    pub fn template(&self) -> &'static str {
        match self {
            Mode::ShortVideo => {
                "- 60秒以内で読み上げられる長さ（400文字程度）にする。\n\
                 - 冒頭の一言で視聴者を引き込み、最後にコメントやフォローを促す。\n\
                 - 台本として「ナレーション」と「テロップ案」を分けて書く。"
            }
            Mode::Article => {
                "- 見出し（##）を3つ以上使って構成する。\n\
                 - 1500文字程度を目安にする。\n\
                 - 最後に要点のまとめを3行で入れる。"
            }
            Mode::SocialPost => {
                "- 140文字以内にまとめる。\n\
                 - 関連するハッシュタグを2〜3個付ける。"
            }
            Mode::Commentator => {
                "- 辛口コメンテーターとして、遠慮のない独自の意見を述べる。\n\
                 - ただし誹謗中傷や差別的な表現は避ける。\n\
                 - 最後に一言で痛快にまとめる。"
            }
        }
    }

    /// Accepts the id or the label.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.id().eq_ignore_ascii_case(s) || m.label() == s)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
