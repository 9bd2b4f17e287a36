// ==========================================
// GoatOS 牧场记录系统 - 导出 API
// ==========================================
// 职责: CSV 导出 (山羊档案、医疗记录、收支、挤奶) + KML 导出 (放牧区)
// 约定: 放牧区坐标无法解析时跳过该区域，不中断导出
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::finance::format_cents;
use crate::domain::{GrazingArea, LatLng};
use crate::repository::{
    FinanceRepository, GoatRepository, HusbandryRepository, MedicalRepository, PastureRepository,
};

pub const GOATS_CSV_HEADER: [&str; 10] = [
    "Name", "Breed", "Gender", "Status", "Birthdate", "Age", "Is Fainting", "Dam", "Sire", "Bio",
];
pub const MEDICAL_CSV_HEADER: [&str; 5] = ["Date", "Goat", "Type", "Notes", "Next Due Date"];
pub const FINANCE_CSV_HEADER: [&str; 5] = ["Date", "Type", "Category", "Amount", "Description"];
pub const MILK_CSV_HEADER: [&str; 5] = ["Date", "Time", "Goat", "Amount (lbs)", "Notes"];

/// KML 多边形默认填充色 (aabbggrr)
pub const KML_FALLBACK_COLOR: &str = "880000ff";

pub struct ExportApi {
    goat_repo: Arc<GoatRepository>,
    medical_repo: Arc<MedicalRepository>,
    pasture_repo: Arc<PastureRepository>,
    finance_repo: Arc<FinanceRepository>,
    husbandry_repo: Arc<HusbandryRepository>,
}

impl ExportApi {
    pub fn new(
        goat_repo: Arc<GoatRepository>,
        medical_repo: Arc<MedicalRepository>,
        pasture_repo: Arc<PastureRepository>,
        finance_repo: Arc<FinanceRepository>,
        husbandry_repo: Arc<HusbandryRepository>,
    ) -> Self {
        Self {
            goat_repo,
            medical_repo,
            pasture_repo,
            finance_repo,
            husbandry_repo,
        }
    }

    /// 山羊档案 CSV（年龄按 today 计算）
    pub fn export_goats_csv(&self, today: NaiveDate) -> ApiResult<String> {
        let goats = self.goat_repo.list_all()?;
        let names: HashMap<&str, &str> = goats
            .iter()
            .map(|g| (g.goat_id.as_str(), g.name.as_str()))
            .collect();
        let name_of = |id: &Option<String>| -> String {
            id.as_deref()
                .and_then(|id| names.get(id).copied())
                .unwrap_or("")
                .to_string()
        };

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(GOATS_CSV_HEADER).map_err(csv_error)?;
        for goat in &goats {
            writer
                .write_record([
                    goat.name.clone(),
                    goat.breed.clone(),
                    goat.gender.to_db_str().to_string(),
                    goat.status.to_db_str().to_string(),
                    goat.birthdate.map(|d| d.to_string()).unwrap_or_default(),
                    goat.display_age(today),
                    if goat.is_fainting { "True" } else { "False" }.to_string(),
                    name_of(&goat.dam_id),
                    name_of(&goat.sire_id),
                    goat.bio.clone(),
                ])
                .map_err(csv_error)?;
        }
        finish_csv(writer)
    }

    /// 医疗记录 CSV
    pub fn export_medical_csv(&self) -> ApiResult<String> {
        let goats = self.goat_repo.list_all()?;
        let names: HashMap<&str, &str> = goats
            .iter()
            .map(|g| (g.goat_id.as_str(), g.name.as_str()))
            .collect();
        let records = self.medical_repo.list_records()?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(MEDICAL_CSV_HEADER).map_err(csv_error)?;
        for r in &records {
            writer
                .write_record([
                    r.performed_date.to_string(),
                    names.get(r.goat_id.as_str()).copied().unwrap_or("").to_string(),
                    r.kind.label().to_string(),
                    r.notes.clone(),
                    r.next_due_date.map(|d| d.to_string()).unwrap_or_default(),
                ])
                .map_err(csv_error)?;
        }
        finish_csv(writer)
    }

    /// 收支流水 CSV（金额保留两位小数）
    pub fn export_finances_csv(&self) -> ApiResult<String> {
        let transactions = self.finance_repo.list_all()?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(FINANCE_CSV_HEADER).map_err(csv_error)?;
        for t in &transactions {
            writer
                .write_record([
                    t.date.to_string(),
                    t.kind.label().to_string(),
                    t.category.label().to_string(),
                    format_cents(t.amount_cents),
                    t.description.clone(),
                ])
                .map_err(csv_error)?;
        }
        finish_csv(writer)
    }

    /// 挤奶记录 CSV（产量保留两位小数）
    pub fn export_milk_csv(&self) -> ApiResult<String> {
        let goats = self.goat_repo.list_all()?;
        let names: HashMap<&str, &str> = goats
            .iter()
            .map(|g| (g.goat_id.as_str(), g.name.as_str()))
            .collect();
        let logs = self.husbandry_repo.list_milk()?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(MILK_CSV_HEADER).map_err(csv_error)?;
        for log in &logs {
            writer
                .write_record([
                    log.date.to_string(),
                    log.time.to_db_str().to_string(),
                    names.get(log.goat_id.as_str()).copied().unwrap_or("").to_string(),
                    format!("{:.2}", log.amount_lbs),
                    log.notes.clone(),
                ])
                .map_err(csv_error)?;
        }
        finish_csv(writer)
    }

    /// 放牧区 KML
    pub fn export_grazing_areas_kml(&self) -> ApiResult<String> {
        let areas = self.pasture_repo.list_all()?;
        Ok(render_kml(&areas))
    }
}

fn csv_error(err: csv::Error) -> ApiError {
    ApiError::ExportError(err.to_string())
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> ApiResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::ExportError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ApiError::ExportError(e.to_string()))
}

// ==========================================
// KML 渲染
// ==========================================

/// `#RRGGBB` → KML 颜色 (aabbggrr)
///
/// 填充色透明度固定 0x88；格式不符时返回默认红色
pub fn kml_color(hex: &str, alpha: &str, fallback: &str) -> String {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return fallback.to_string();
    }
    let (r, g, b) = (&hex[0..2], &hex[2..4], &hex[4..6]);
    format!("{}{}{}{}", alpha, b, g, r)
}

/// 多边形坐标串 "lng,lat,0 ..."，首点追加到末尾闭合
pub fn kml_coordinates(points: &[LatLng]) -> String {
    let mut parts: Vec<String> = points
        .iter()
        .map(|p| format!("{},{},0", p.lng, p.lat))
        .collect();
    if let Some(first) = points.first() {
        parts.push(format!("{},{},0", first.lng, first.lat));
    }
    parts.join(" ")
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// 渲染 KML 文档；坐标无法解析的区域记 warn 后跳过
pub fn render_kml(areas: &[GrazingArea]) -> String {
    let mut placemarks = String::new();

    for area in areas {
        let points = match area.parse_coordinates() {
            Ok(points) => points,
            Err(reason) => {
                tracing::warn!(
                    area_id = %area.area_id,
                    reason = %reason,
                    "放牧区坐标无法解析，导出时跳过"
                );
                continue;
            }
        };

        placemarks.push_str(&format!(
            r#"    <Placemark>
      <name>{name}</name>
      <Style>
        <PolyStyle><color>{fill}</color></PolyStyle>
        <LineStyle><color>{line}</color><width>2</width></LineStyle>
      </Style>
      <Polygon>
        <outerBoundaryIs><LinearRing>
            <coordinates>{coords}</coordinates>
        </LinearRing></outerBoundaryIs>
      </Polygon>
    </Placemark>
"#,
            name = xml_escape(&area.name),
            fill = kml_color(&area.color, "88", KML_FALLBACK_COLOR),
            line = kml_color(&area.color, "ff", "ff0000ff"),
            coords = kml_coordinates(&points),
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>GoatOS Grazing Areas</name>
{}  </Document>
</kml>
"#,
        placemarks
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(name: &str, color: &str, coordinates: &str) -> GrazingArea {
        GrazingArea {
            area_id: name.to_lowercase(),
            name: name.to_string(),
            color: color.to_string(),
            coordinates: coordinates.to_string(),
        }
    }

    #[test]
    fn test_kml_color_conversion() {
        assert_eq!(kml_color("#112233", "88", KML_FALLBACK_COLOR), "88332211");
        assert_eq!(kml_color("red", "88", KML_FALLBACK_COLOR), KML_FALLBACK_COLOR);
        assert_eq!(kml_color("#12345", "88", KML_FALLBACK_COLOR), KML_FALLBACK_COLOR);
    }

    #[test]
    fn test_polygon_is_closed() {
        let points = vec![LatLng { lat: 1.0, lng: 2.0 }, LatLng { lat: 3.0, lng: 4.0 }];
        assert_eq!(kml_coordinates(&points), "2,1,0 4,3,0 2,1,0");
        assert_eq!(kml_coordinates(&[]), "");
    }

    #[test]
    fn test_render_skips_malformed_areas() {
        let areas = vec![
            area("North", "#00FF00", r#"[{"lat": 1.0, "lng": 2.0}]"#),
            area("Broken", "#0000FF", "oops"),
            area("A&B", "#FF0000", "[]"),
        ];
        let kml = render_kml(&areas);
        assert!(kml.contains("<name>North</name>"));
        assert!(kml.contains("<color>8800ff00</color>"));
        assert!(!kml.contains("Broken"));
        assert!(kml.contains("<name>A&amp;B</name>"));
        assert_eq!(kml.matches("<Placemark>").count(), 2);
    }
}
