// ==========================================
// GoatOS 牧场记录系统 - 领域类型定义
// ==========================================
// 职责: 畜群记录中使用的枚举类型
// 存储: 数据库中统一存 SCREAMING_SNAKE_CASE 字符串
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 健康状态 (Goat Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoatStatus {
    Healthy,  // 健康
    Sick,     // 生病
    Vet,      // 就医中
    Deceased, // 已死亡
}

impl fmt::Display for GoatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl GoatStatus {
    /// 从数据库字符串解析
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "HEALTHY" => Some(GoatStatus::Healthy),
            "SICK" => Some(GoatStatus::Sick),
            "VET" => Some(GoatStatus::Vet),
            "DECEASED" => Some(GoatStatus::Deceased),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            GoatStatus::Healthy => "HEALTHY",
            GoatStatus::Sick => "SICK",
            GoatStatus::Vet => "VET",
            GoatStatus::Deceased => "DECEASED",
        }
    }
}

// ==========================================
// 性别 (Gender)
// ==========================================
// Doe/Doeling 为母羊，参与发情与产羔提醒
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Doe,      // 成年母羊
    Buck,     // 成年公羊
    Wether,   // 阉羊
    Doeling,  // 小母羊
    Buckling, // 小公羊
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Gender {
    /// 从数据库字符串解析
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "DOE" => Some(Gender::Doe),
            "BUCK" => Some(Gender::Buck),
            "WETHER" => Some(Gender::Wether),
            "DOELING" => Some(Gender::Doeling),
            "BUCKLING" => Some(Gender::Buckling),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Gender::Doe => "DOE",
            Gender::Buck => "BUCK",
            Gender::Wether => "WETHER",
            Gender::Doeling => "DOELING",
            Gender::Buckling => "BUCKLING",
        }
    }

    /// 是否为母羊（成年或幼年）
    pub fn is_female(&self) -> bool {
        matches!(self, Gender::Doe | Gender::Doeling)
    }
}

// ==========================================
// 医疗记录类型 (Medical Kind)
// ==========================================
// 医疗记录与周期计划共用同一组类型，按类型匹配推进计划
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MedicalKind {
    Vaccine, // 疫苗
    Deworm,  // 驱虫
    Hoof,    // 修蹄
    Checkup, // 常规检查
    Illness, // 疾病/外伤
}

impl fmt::Display for MedicalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl MedicalKind {
    /// 从数据库字符串解析
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "VACCINE" => Some(MedicalKind::Vaccine),
            "DEWORM" => Some(MedicalKind::Deworm),
            "HOOF" => Some(MedicalKind::Hoof),
            "CHECKUP" => Some(MedicalKind::Checkup),
            "ILLNESS" => Some(MedicalKind::Illness),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MedicalKind::Vaccine => "VACCINE",
            MedicalKind::Deworm => "DEWORM",
            MedicalKind::Hoof => "HOOF",
            MedicalKind::Checkup => "CHECKUP",
            MedicalKind::Illness => "ILLNESS",
        }
    }

    /// 展示名称（日历标题、导出使用）
    pub fn label(&self) -> &'static str {
        match self {
            MedicalKind::Vaccine => "Vaccination",
            MedicalKind::Deworm => "Deworming",
            MedicalKind::Hoof => "Hoof Trim",
            MedicalKind::Checkup => "General Checkup",
            MedicalKind::Illness => "Illness/Injury",
        }
    }
}

// ==========================================
// 圈舍类型 (Pen Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PenType {
    Kidding, // 产羔圈
    Buck,    // 公羊圈
    Doe,     // 母羊圈
    Kid,     // 羔羊圈
    Sick,    // 病羊隔离圈
    General, // 通用
}

impl PenType {
    /// 从数据库字符串解析，未知值按通用圈处理
    pub fn from_db_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "KIDDING" => PenType::Kidding,
            "BUCK" => PenType::Buck,
            "DOE" => PenType::Doe,
            "KID" => PenType::Kid,
            "SICK" => PenType::Sick,
            _ => PenType::General,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PenType::Kidding => "KIDDING",
            PenType::Buck => "BUCK",
            PenType::Doe => "DOE",
            PenType::Kid => "KID",
            PenType::Sick => "SICK",
            PenType::General => "GENERAL",
        }
    }
}

// ==========================================
// 产羔类型 / 胎位
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BirthType {
    Single,
    Twins,
    Triplets,
    Quads,
}

impl BirthType {
    pub fn from_db_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "TWINS" => BirthType::Twins,
            "TRIPLETS" => BirthType::Triplets,
            "QUADS" => BirthType::Quads,
            _ => BirthType::Single,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            BirthType::Single => "SINGLE",
            BirthType::Twins => "TWINS",
            BirthType::Triplets => "TRIPLETS",
            BirthType::Quads => "QUADS",
        }
    }

    /// 展示名称
    pub fn label(&self) -> &'static str {
        match self {
            BirthType::Single => "Single",
            BirthType::Twins => "Twins",
            BirthType::Triplets => "Triplets",
            BirthType::Quads => "Quads",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Presentation {
    Normal,
    Breach,
    Other,
}

impl Presentation {
    pub fn from_db_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "NORMAL" => Presentation::Normal,
            "BREACH" => Presentation::Breach,
            _ => Presentation::Other,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Presentation::Normal => "NORMAL",
            Presentation::Breach => "BREACH",
            Presentation::Other => "OTHER",
        }
    }
}

// ==========================================
// 饲喂类型 (Feed Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedType {
    Hay,
    Grain,
    Minerals,
    Treats,
    Other,
}

impl FeedType {
    /// 从数据库字符串解析，未知值归为 Other
    pub fn from_db_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "HAY" => FeedType::Hay,
            "GRAIN" => FeedType::Grain,
            "MINERALS" => FeedType::Minerals,
            "TREATS" => FeedType::Treats,
            _ => FeedType::Other,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            FeedType::Hay => "HAY",
            FeedType::Grain => "GRAIN",
            FeedType::Minerals => "MINERALS",
            FeedType::Treats => "TREATS",
            FeedType::Other => "OTHER",
        }
    }
}

// ==========================================
// 挤奶时段 (Milking Time)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MilkingTime {
    #[serde(rename = "AM")]
    Morning,
    #[serde(rename = "PM")]
    Evening,
}

impl MilkingTime {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "AM" => Some(MilkingTime::Morning),
            "PM" => Some(MilkingTime::Evening),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            MilkingTime::Morning => "AM",
            MilkingTime::Evening => "PM",
        }
    }
}

// ==========================================
// 收支 (Transaction Type / Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Expense, // 支出
    Income,  // 收入
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl TransactionType {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "EXPENSE" => Some(TransactionType::Expense),
            "INCOME" => Some(TransactionType::Income),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "EXPENSE",
            TransactionType::Income => "INCOME",
        }
    }

    /// 展示名称（导出使用）
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Expense => "Expense",
            TransactionType::Income => "Income",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionCategory {
    Feed,
    Vet,
    Equipment,
    GoatSale,
    ProductSale, // 奶、皂等产品
    Other,
}

impl TransactionCategory {
    /// 从数据库字符串解析，未知值归为 Other
    pub fn from_db_str(s: &str) -> Self {
        match s.trim().to_uppercase().replace(' ', "_").as_str() {
            "FEED" => TransactionCategory::Feed,
            "VET" => TransactionCategory::Vet,
            "EQUIPMENT" => TransactionCategory::Equipment,
            "GOAT_SALE" => TransactionCategory::GoatSale,
            "PRODUCT_SALE" => TransactionCategory::ProductSale,
            _ => TransactionCategory::Other,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            TransactionCategory::Feed => "FEED",
            TransactionCategory::Vet => "VET",
            TransactionCategory::Equipment => "EQUIPMENT",
            TransactionCategory::GoatSale => "GOAT_SALE",
            TransactionCategory::ProductSale => "PRODUCT_SALE",
            TransactionCategory::Other => "OTHER",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionCategory::Feed => "Feed",
            TransactionCategory::Vet => "Vet",
            TransactionCategory::Equipment => "Equipment",
            TransactionCategory::GoatSale => "Goat Sale",
            TransactionCategory::ProductSale => "Product Sale",
            TransactionCategory::Other => "Other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medical_kind_round_trip_db_str() {
        for kind in [
            MedicalKind::Vaccine,
            MedicalKind::Deworm,
            MedicalKind::Hoof,
            MedicalKind::Checkup,
            MedicalKind::Illness,
        ] {
            assert_eq!(MedicalKind::from_db_str(kind.to_db_str()), Some(kind));
        }
        assert_eq!(MedicalKind::from_db_str("deworm"), Some(MedicalKind::Deworm));
        assert_eq!(MedicalKind::from_db_str("shearing"), None);
    }

    #[test]
    fn test_gender_is_female() {
        assert!(Gender::Doe.is_female());
        assert!(Gender::Doeling.is_female());
        assert!(!Gender::Buck.is_female());
        assert!(!Gender::Wether.is_female());
    }

    #[test]
    fn test_pen_type_unknown_falls_back_to_general() {
        assert_eq!(PenType::from_db_str("kidding"), PenType::Kidding);
        assert_eq!(PenType::from_db_str("loft"), PenType::General);
    }

    #[test]
    fn test_ledger_enums_parse_labels() {
        assert_eq!(
            TransactionCategory::from_db_str("Goat Sale"),
            TransactionCategory::GoatSale
        );
        assert_eq!(TransactionCategory::from_db_str("fuel"), TransactionCategory::Other);
        assert_eq!(TransactionCategory::ProductSale.label(), "Product Sale");
        assert_eq!(TransactionType::from_db_str("income"), Some(TransactionType::Income));
        assert_eq!(TransactionType::from_db_str("gift"), None);
        assert_eq!(MilkingTime::from_db_str("pm"), Some(MilkingTime::Evening));
        assert_eq!(MilkingTime::from_db_str("noon"), None);
        assert_eq!(FeedType::from_db_str("alfalfa"), FeedType::Other);
    }
}
