use super::or_dash;
use crate::app::App;
use crate::cli::{PatientsArgs, UpdatePatientArgs};
use api_shared::{PageParams, Paginated};
use chrono::FixedOffset;
use emr_client::{ClientError, ClientResult, PatientListParams};
use emr_core::general_files::format_size;
use emr_core::search::PatientFilter;
use emr_core::time_folder::{find_folder, group_into_time_folders, Granularity, TimeFolder};
use emr_core::{BloodType, CoreError, Gender, MedicalRecord, Patient, PatientFile, PatientUpdate};
use std::fmt::Write;

#[derive(Clone, Copy, Debug, Default)]
pub struct DetailOptions {
    pub records: bool,
    pub files: bool,
    pub json: bool,
}

pub async fn list(app: &App, args: &PatientsArgs) -> ClientResult<String> {
    let filter = filter_from_args(args)?;

    if let Some(group) = &args.group {
        let granularity: Granularity = group.parse().map_err(CoreError::InvalidInput)?;
        let patients = app.client.patients().all(args.search.as_deref()).await?;
        let visible: Vec<Patient> = filter.apply(&patients).into_iter().cloned().collect();
        let folders = group_into_time_folders(&visible, granularity, app.offset());

        return match &args.folder {
            Some(label) => {
                let folder = find_folder(&folders, label)
                    .ok_or_else(|| ClientError::NotFound(format!("folder {label}")))?;
                let mut out = format!("{} ({} bệnh nhân)\n", folder.label, folder.count());
                out.push_str(&render_patient_rows(&folder.items, app.offset()));
                Ok(out)
            }
            None => Ok(render_folders(&folders)),
        };
    }

    let params = PatientListParams {
        search: args.search.clone(),
        page: PageParams::new(args.page, args.limit),
    };
    let page = app.client.patients().list(&params).await?;
    if args.json {
        return Ok(serde_json::to_string_pretty(&page)?);
    }
    Ok(render_page(&page, &filter, app.offset()))
}

pub async fn detail(app: &App, id: &str, options: DetailOptions) -> ClientResult<String> {
    let patients = app.client.patients();
    let patient = patients.detail(id).await?;
    if options.json {
        return Ok(serde_json::to_string_pretty(&patient)?);
    }

    let mut out = render_patient(&patient, app);
    if options.records {
        let records = patients.records(id).await?;
        out.push_str("\n\n");
        out.push_str(&render_records(&records));
    }
    if options.files {
        let files = patients.files(id).await?;
        out.push_str("\n\n");
        out.push_str(&render_patient_files(&files));
    }
    Ok(out)
}

pub async fn update(app: &App, args: &UpdatePatientArgs) -> ClientResult<String> {
    let update = PatientUpdate {
        full_name: args.name.clone(),
        phone: args.phone.clone(),
        email: args.email.clone(),
        address: args.address.clone(),
        allergies: args.allergies.as_deref().map(split_list),
        assigned_doctor: args.doctor.clone(),
        ..Default::default()
    };
    let saved = app.client.patients().update(&args.id, &update).await?;
    Ok(format!("Đã cập nhật hồ sơ của {} ({}).", saved.full_name, saved.id))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn filter_from_args(args: &PatientsArgs) -> ClientResult<PatientFilter> {
    let gender = match args.gender.as_deref() {
        Some(raw) => Some(
            Gender::from_filter(raw)
                .ok_or_else(|| CoreError::InvalidInput(format!("unknown gender {raw:?}")))?,
        ),
        None => None,
    };
    let blood_type = match args.blood_type.as_deref() {
        Some(raw) => Some(
            BloodType::parse(raw)
                .ok_or_else(|| CoreError::InvalidInput(format!("unknown blood type {raw:?}")))?,
        ),
        None => None,
    };
    Ok(PatientFilter {
        query: None,
        gender,
        blood_type,
    })
}

pub fn render_folders(folders: &[TimeFolder<'_, Patient>]) -> String {
    if folders.is_empty() {
        return "Chưa có bệnh nhân.".into();
    }
    let mut out = String::new();
    for folder in folders {
        let _ = writeln!(out, "{:<20} {:>4} bệnh nhân", folder.label, folder.count());
    }
    out.trim_end().to_string()
}

pub fn render_page(page: &Paginated<Patient>, filter: &PatientFilter, offset: FixedOffset) -> String {
    let rows = filter.apply(&page.data);
    if rows.is_empty() {
        return "Không có bệnh nhân phù hợp.".into();
    }
    let mut out = render_patient_rows(&rows, offset);
    let _ = write!(
        out,
        "\nTrang {}/{} · {} bệnh nhân",
        page.page,
        page.total_pages().max(1),
        page.total
    );
    out
}

fn render_patient_rows(patients: &[&Patient], offset: FixedOffset) -> String {
    let mut out = String::new();
    for patient in patients {
        let birth = patient
            .birth_date(offset)
            .map(|d| d.format("%d/%m/%Y").to_string());
        let _ = writeln!(
            out,
            "{:<12} {:<28} {:<6} {:<10} {}",
            patient.id,
            patient.full_name,
            patient.gender.label(),
            or_dash(birth.as_deref()),
            or_dash(patient.phone.as_deref()),
        );
    }
    out
}

fn render_patient(patient: &Patient, app: &App) -> String {
    let offset = app.offset();
    let age = patient
        .age_on(app.today(), offset)
        .map(|a| format!("{a} tuổi"));
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", patient.full_name, patient.id);
    let _ = writeln!(out, "Giới tính:   {}", patient.gender.label());
    let _ = writeln!(
        out,
        "Ngày sinh:   {} {}",
        or_dash(patient.date_of_birth.as_deref()),
        age.map(|a| format!("({a})")).unwrap_or_default()
    );
    let _ = writeln!(out, "Điện thoại:  {}", or_dash(patient.phone.as_deref()));
    let _ = writeln!(out, "Email:       {}", or_dash(patient.email.as_deref()));
    let _ = writeln!(out, "Địa chỉ:     {}", or_dash(patient.address.as_deref()));
    let _ = writeln!(out, "CCCD:        {}", or_dash(patient.citizen_id.as_deref()));
    let _ = writeln!(
        out,
        "Nhóm máu:    {}",
        patient.blood_type.map_or("-", |b| b.as_str())
    );
    let _ = writeln!(out, "Bác sĩ:      {}", or_dash(patient.assigned_doctor.as_deref()));
    let _ = writeln!(out, "Dị ứng:      {}", join_or_dash(&patient.allergies));
    let _ = writeln!(out, "Tiền sử:     {}", join_or_dash(&patient.medical_history));

    if let Some(vitals) = &patient.vital_signs {
        let mut parts = Vec::new();
        if let Some(bp) = vitals.blood_pressure() {
            parts.push(format!("HA {bp} mmHg"));
        }
        if let Some(hr) = vitals.heart_rate {
            parts.push(format!("mạch {hr} l/p"));
        }
        if let Some(t) = vitals.temperature {
            parts.push(format!("{t}°C"));
        }
        if let Some(spo2) = vitals.oxygen_saturation {
            parts.push(format!("SpO2 {spo2}%"));
        }
        if let Some(bmi) = vitals.bmi() {
            parts.push(format!("BMI {bmi:.1}"));
        }
        if !parts.is_empty() {
            let _ = writeln!(out, "Sinh hiệu:   {}", parts.join(", "));
        }
    }
    if let Some(contact) = &patient.emergency_contact {
        let _ = writeln!(
            out,
            "Liên hệ khẩn: {} ({}) {}",
            contact.name,
            or_dash(contact.relationship.as_deref()),
            or_dash(contact.phone.as_deref())
        );
    }
    if let Some(insurance) = &patient.insurance {
        let _ = writeln!(
            out,
            "Bảo hiểm:    {} {} (hết hạn {})",
            or_dash(insurance.provider.as_deref()),
            or_dash(insurance.policy_number.as_deref()),
            or_dash(insurance.valid_until.as_deref())
        );
    }
    out.trim_end().to_string()
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".into()
    } else {
        items.join(", ")
    }
}

pub fn render_records(records: &[MedicalRecord]) -> String {
    if records.is_empty() {
        return "Chưa có bệnh án.".into();
    }
    let mut out = String::from("Bệnh án\n");
    for record in records {
        let _ = writeln!(
            out,
            "- {} · {} · {}",
            or_dash(record.visit_date.as_deref()),
            or_dash(record.doctor_name.as_deref()),
            or_dash(record.diagnosis.as_deref())
        );
        if let Some(treatment) = record.treatment.as_deref() {
            let _ = writeln!(out, "    Điều trị: {treatment}");
        }
        for result in &record.test_results {
            let flag = if result.is_abnormal { " (!)" } else { "" };
            let _ = writeln!(
                out,
                "    {}: {} {}{flag}",
                result.name,
                or_dash(result.value.as_deref()),
                result.unit.as_deref().unwrap_or_default()
            );
        }
    }
    out.trim_end().to_string()
}

pub fn render_patient_files(files: &[PatientFile]) -> String {
    if files.is_empty() {
        return "Chưa có tệp đính kèm.".into();
    }
    let mut out = String::from("Tệp đính kèm\n");
    for file in files {
        let _ = writeln!(
            out,
            "- {} ({}) · {}",
            file.name,
            file.size.map_or_else(|| "-".to_string(), format_size),
            file.storage_key
        );
    }
    out.trim_end().to_string()
}
