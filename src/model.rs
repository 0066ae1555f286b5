//! Scraped ad records
//!
//! Every string field defaults to empty and every list to empty, so a record
//! missing a table row still serializes with the same shape. The legacy
//! aliases (`location`, `pay`, `phones`, `content`) and `thumbnail` are
//! computed from the owned fields on serialization; they carry no state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Who placed the ad and how to reach them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvertiserInfo {
    pub nickname: String,
    pub call_number: String,
    pub call_mgmt_number: String,
    pub phone: String,
    pub kakao_id: String,
    pub telegram_id: String,
    pub business_name: String,
    pub work_location: String,
    pub views: u64,
}

/// Job conditions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecruitmentInfo {
    pub job_type: String,
    pub employment_type: String,
    pub salary: String,
    pub deadline: String,
    pub benefits: Vec<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyInfo {
    pub company_name: String,
    pub company_address: String,
    pub representative: String,
}

/// Free-form body of the ad
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailContent {
    pub description: String,

    /// Absolute, deduplicated image URLs in page order
    pub images: Vec<String>,
}

/// One scraped ad detail page
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdRecord {
    /// Numeric id from the detail URL; 0 when the URL carries none
    pub id: u64,
    pub url: String,

    /// Never empty; see [`crate::extract::resolve_title`]
    pub title: String,

    /// Capture time, not the ad's publish time
    pub scraped_at: DateTime<Utc>,

    #[serde(default)]
    pub advertiser: AdvertiserInfo,
    #[serde(default)]
    pub recruitment: RecruitmentInfo,
    #[serde(default)]
    pub detail: DetailContent,
    #[serde(default)]
    pub company: CompanyInfo,
}

impl AdRecord {
    /// Creates an otherwise empty record with the placeholder title
    pub fn new(id: u64, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            title: placeholder_title(id),
            scraped_at: Utc::now(),
            advertiser: AdvertiserInfo::default(),
            recruitment: RecruitmentInfo::default(),
            detail: DetailContent::default(),
            company: CompanyInfo::default(),
        }
    }

    /// First detail image, or empty
    pub fn thumbnail(&self) -> &str {
        self.detail.images.first().map(String::as_str).unwrap_or("")
    }

    pub fn detail_images(&self) -> &[String] {
        &self.detail.images
    }

    pub fn location(&self) -> &str {
        &self.advertiser.work_location
    }

    pub fn pay(&self) -> &str {
        &self.recruitment.salary
    }

    pub fn phones(&self) -> Vec<&str> {
        if self.advertiser.phone.is_empty() {
            Vec::new()
        } else {
            vec![self.advertiser.phone.as_str()]
        }
    }

    pub fn content(&self) -> &str {
        &self.detail.description
    }

    /// One-row view used by the CSV writer
    pub fn to_flat(&self) -> FlatRecord<'_> {
        FlatRecord {
            id: self.id,
            url: &self.url,
            title: &self.title,
            scraped_at: self.scraped_at.to_rfc3339(),
            nickname: &self.advertiser.nickname,
            phone: &self.advertiser.phone,
            kakao_id: &self.advertiser.kakao_id,
            telegram_id: &self.advertiser.telegram_id,
            business_name: &self.advertiser.business_name,
            work_location: &self.advertiser.work_location,
            views: self.advertiser.views,
            job_type: &self.recruitment.job_type,
            salary: &self.recruitment.salary,
            deadline: &self.recruitment.deadline,
            company_name: &self.company.company_name,
            company_address: &self.company.company_address,
            thumbnail: self.thumbnail(),
            image_count: self.detail.images.len(),
        }
    }
}

/// Fallback title when the page offers nothing better
pub fn placeholder_title(id: u64) -> String {
    format!("Ad #{}", id)
}

/// Serialized shape of [`AdRecord`], derived fields included
#[derive(Serialize)]
struct AdRecordView<'a> {
    id: u64,
    url: &'a str,
    title: &'a str,
    scraped_at: &'a DateTime<Utc>,
    advertiser: &'a AdvertiserInfo,
    recruitment: &'a RecruitmentInfo,
    detail: &'a DetailContent,
    thumbnail: &'a str,
    company: &'a CompanyInfo,
    location: &'a str,
    pay: &'a str,
    phones: Vec<&'a str>,
    content: &'a str,
}

impl Serialize for AdRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        AdRecordView {
            id: self.id,
            url: &self.url,
            title: &self.title,
            scraped_at: &self.scraped_at,
            advertiser: &self.advertiser,
            recruitment: &self.recruitment,
            detail: &self.detail,
            thumbnail: self.thumbnail(),
            company: &self.company,
            location: self.location(),
            pay: self.pay(),
            phones: self.phones(),
            content: self.content(),
        }
        .serialize(serializer)
    }
}

/// Flattened record with the legacy column names
#[derive(Debug, Serialize)]
pub struct FlatRecord<'a> {
    pub id: u64,
    pub url: &'a str,
    pub title: &'a str,
    pub scraped_at: String,
    pub nickname: &'a str,
    pub phone: &'a str,
    pub kakao_id: &'a str,
    pub telegram_id: &'a str,
    pub business_name: &'a str,
    pub work_location: &'a str,
    pub views: u64,
    pub job_type: &'a str,
    pub salary: &'a str,
    pub deadline: &'a str,
    pub company_name: &'a str,
    pub company_address: &'a str,
    pub thumbnail: &'a str,
    pub image_count: usize,
}
