//! Label table for the detail page's label/value rows
//!
//! Every `<tr>` with at least two cells is read as `label | value`. The
//! label is matched against [`LABEL_RULES`], an ordered table mapping label
//! tokens to record fields. Within one section the first matching rule
//! claims the row; a row may feed one field in each section. A field keeps
//! the first non-empty value it receives.

use crate::extract::{element_text, selector, ParseError};
use crate::model::{AdvertiserInfo, CompanyInfo, RecruitmentInfo};
use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;

/// The part of the record a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Advertiser,
    Recruitment,
    Company,
}

/// Every field the label table can populate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Nickname,
    CallNumber,
    CallMgmtNumber,
    Phone,
    KakaoId,
    TelegramId,
    BusinessName,
    WorkLocation,
    JobType,
    EmploymentType,
    Salary,
    Deadline,
    Benefits,
    CompanyName,
    CompanyAddress,
    Representative,
}

impl Field {
    pub fn section(&self) -> Section {
        match self {
            Self::Nickname
            | Self::CallNumber
            | Self::CallMgmtNumber
            | Self::Phone
            | Self::KakaoId
            | Self::TelegramId
            | Self::BusinessName
            | Self::WorkLocation => Section::Advertiser,
            Self::JobType
            | Self::EmploymentType
            | Self::Salary
            | Self::Deadline
            | Self::Benefits => Section::Recruitment,
            Self::CompanyName | Self::CompanyAddress | Self::Representative => Section::Company,
        }
    }
}

/// How a single token is compared with a row label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMatch {
    /// Label contains the token
    Contains(&'static str),

    /// Label contains the first token but not the second
    ContainsWithout(&'static str, &'static str),

    /// Label is exactly the token
    Exact(&'static str),
}

impl LabelMatch {
    pub fn matches(&self, label: &str) -> bool {
        match *self {
            Self::Contains(token) => label.contains(token),
            Self::ContainsWithout(token, excluded) => {
                label.contains(token) && !label.contains(excluded)
            }
            Self::Exact(token) => label == token,
        }
    }
}

/// One entry of the label table
#[derive(Debug, Clone, Copy)]
pub struct LabelRule {
    pub field: Field,
    pub matchers: &'static [LabelMatch],
}

impl LabelRule {
    pub fn matches(&self, label: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(label))
    }
}

use LabelMatch::{Contains, ContainsWithout, Exact};

/// Ordered label table; order decides ties inside a section
#[rustfmt::skip]
pub const LABEL_RULES: &[LabelRule] = &[
    LabelRule { field: Field::Nickname, matchers: &[Contains("닉네임")] },
    LabelRule { field: Field::CallNumber, matchers: &[ContainsWithout("콜번호", "관리")] },
    LabelRule { field: Field::CallMgmtNumber, matchers: &[Contains("콜관리")] },
    LabelRule { field: Field::Phone, matchers: &[Contains("전화")] },
    LabelRule { field: Field::KakaoId, matchers: &[Contains("카톡"), Contains("카카오")] },
    LabelRule { field: Field::TelegramId, matchers: &[Contains("텔레그램")] },
    LabelRule { field: Field::BusinessName, matchers: &[Contains("상호")] },
    LabelRule { field: Field::WorkLocation, matchers: &[Contains("근무지역"), Exact("지역")] },
    LabelRule { field: Field::JobType, matchers: &[Contains("업무내용"), Contains("업종")] },
    LabelRule { field: Field::EmploymentType, matchers: &[Contains("고용형태")] },
    LabelRule { field: Field::Salary, matchers: &[Contains("급여")] },
    LabelRule { field: Field::Deadline, matchers: &[Contains("마감")] },
    LabelRule { field: Field::Benefits, matchers: &[Contains("복리후생"), Contains("혜택")] },
    LabelRule { field: Field::CompanyName, matchers: &[Contains("회사명"), Contains("업체명")] },
    LabelRule { field: Field::CompanyAddress, matchers: &[Contains("회사주소"), Exact("주소")] },
    LabelRule { field: Field::Representative, matchers: &[Contains("대표자")] },
];

/// Fields a label feeds: at most one per section, in table order
pub fn match_label(label: &str) -> Vec<Field> {
    let mut claimed: Vec<Field> = Vec::new();
    for rule in LABEL_RULES {
        let section = rule.field.section();
        if claimed.iter().any(|f| f.section() == section) {
            continue;
        }
        if rule.matches(label) {
            claimed.push(rule.field);
        }
    }
    claimed
}

/// A `<tr>` reduced to its first two cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRow {
    pub label: String,
    pub value: String,
}

/// Collects every table row with at least two `td`/`th` cells
pub fn table_rows(document: &Html) -> Result<Vec<LabelRow>, ParseError> {
    let row_selector = selector("tr")?;
    let cell_selector = selector("td, th")?;

    let rows = document
        .select(&row_selector)
        .filter_map(|row| {
            let mut cells = row.select(&cell_selector);
            let label = cells.next()?;
            let value = cells.next()?;
            Some(LabelRow {
                label: element_text(label),
                value: element_text(value),
            })
        })
        .collect();

    Ok(rows)
}

/// The three table-driven sections of a record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFields {
    pub advertiser: AdvertiserInfo,
    pub recruitment: RecruitmentInfo,
    pub company: CompanyInfo,
}

impl TableFields {
    /// Evaluates the label table once per row
    pub fn from_rows(rows: &[LabelRow]) -> Self {
        let mut fields = Self::default();
        for row in rows {
            for field in match_label(&row.label) {
                fields.assign(field, &row.value);
            }
        }
        fields
    }

    /// Sets `field` from `value` unless it already holds something
    pub fn assign(&mut self, field: Field, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }

        let slot = match field {
            Field::Nickname => &mut self.advertiser.nickname,
            Field::CallNumber => &mut self.advertiser.call_number,
            Field::CallMgmtNumber => &mut self.advertiser.call_mgmt_number,
            Field::Phone => &mut self.advertiser.phone,
            Field::KakaoId => &mut self.advertiser.kakao_id,
            Field::TelegramId => &mut self.advertiser.telegram_id,
            Field::BusinessName => &mut self.advertiser.business_name,
            Field::WorkLocation => &mut self.advertiser.work_location,
            Field::JobType => &mut self.recruitment.job_type,
            Field::EmploymentType => &mut self.recruitment.employment_type,
            Field::Salary => {
                if self.recruitment.salary.is_empty() {
                    self.recruitment.salary = salary_amount(value);
                }
                return;
            }
            Field::Deadline => &mut self.recruitment.deadline,
            Field::Benefits => {
                if self.recruitment.benefits.is_empty() {
                    self.recruitment.benefits = split_list(value);
                }
                return;
            }
            Field::CompanyName => &mut self.company.company_name,
            Field::CompanyAddress => &mut self.company.company_address,
            Field::Representative => &mut self.company.representative,
        };

        if slot.is_empty() {
            *slot = value.to_string();
        }
    }
}

fn salary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d[\d,]*원)").expect("static regex"))
}

/// Keeps just the won amount when the value has one
fn salary_amount(value: &str) -> String {
    salary_regex()
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| value.to_string())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split([',', '/', '·'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
