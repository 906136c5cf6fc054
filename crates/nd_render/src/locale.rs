use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use nd_core::{Error, Result, ERROR_LABEL, UNCLASSIFIED_LABEL};

/// Category labels in the order their sections appear in a newsletter.
pub const CATEGORY_ORDER: [&str; 7] = [
    "Research & Breakthroughs",
    "Industry Applications & Case Studies",
    "Ethics, Governance & Policy",
    "AI Tools, Platforms & Resources",
    "Market Trends & Investments",
    "Academic Conferences & Community Events",
    UNCLASSIFIED_LABEL,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    ZhTw,
}

impl Locale {
    pub fn newsletter_title(&self) -> &'static str {
        match self {
            Locale::En => "AI Science Digest",
            Locale::ZhTw => "AI 科普速遞",
        }
    }

    pub fn empty_body(&self) -> &'static str {
        match self {
            Locale::En => "No articles were fetched or processed today.",
            Locale::ZhTw => "今日未擷取或處理任何文章。",
        }
    }

    pub fn no_content(&self) -> &'static str {
        match self {
            Locale::En => "No Content",
            Locale::ZhTw => "無內容",
        }
    }

    pub fn source_label(&self) -> &'static str {
        match self {
            Locale::En => "Source:",
            Locale::ZhTw => "來源：",
        }
    }

    pub fn published_label(&self) -> &'static str {
        match self {
            Locale::En => "Published:",
            Locale::ZhTw => "原文發布日期：",
        }
    }

    pub fn read_original(&self) -> &'static str {
        match self {
            Locale::En => "Read the original",
            Locale::ZhTw => "閱讀原文",
        }
    }

    /// Section heading for a category label. Unknown labels are shown as-is.
    pub fn category_title<'a>(&self, label: &'a str) -> &'a str {
        match self {
            Locale::En => label,
            Locale::ZhTw => match label {
                "Research & Breakthroughs" => "研究與突破",
                "Industry Applications & Case Studies" => "產業應用與案例",
                "Ethics, Governance & Policy" => "倫理、治理與政策",
                "AI Tools, Platforms & Resources" => "AI工具、平台與資源",
                "Market Trends & Investments" => "市場動態與投資",
                "Academic Conferences & Community Events" => "學術會議與社區活動",
                UNCLASSIFIED_LABEL => "未分類文章",
                ERROR_LABEL => "分類錯誤",
                other => other,
            },
        }
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        match self {
            Locale::En => date.format("%B %-d, %Y").to_string(),
            Locale::ZhTw => date.format("%Y年%m月%d日").to_string(),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => f.write_str("en"),
            Locale::ZhTw => f.write_str("zh-tw"),
        }
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "en" | "en-us" => Ok(Locale::En),
            "zh-tw" | "zh" => Ok(Locale::ZhTw),
            other => Err(Error::Config(format!("unsupported locale '{}'; expected 'en' or 'zh-tw'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale() {
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!("zh_TW".parse::<Locale>().unwrap(), Locale::ZhTw);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_category_titles() {
        assert_eq!(Locale::ZhTw.category_title("Research & Breakthroughs"), "研究與突破");
        assert_eq!(Locale::ZhTw.category_title("Robotics"), "Robotics");
        assert_eq!(Locale::En.category_title(UNCLASSIFIED_LABEL), "Unclassified");
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(Locale::En.format_date(date), "May 1, 2024");
        assert_eq!(Locale::ZhTw.format_date(date), "2024年05月01日");
    }
}
