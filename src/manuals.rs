use crate::formats::{CatalogDoc, ManualDoc, Section};

const USER_HANDBOOK_PDF: &str = "/manuals/user-handbook.pdf";
const TECHNICAL_MANUAL_PDF: &str = "/manuals/technical-manual.pdf";

/// The two manuals shipped with the binary.
#[must_use]
pub fn builtin() -> CatalogDoc {
    CatalogDoc {
        user: user_handbook(),
        technical: technical_manual(),
    }
}

#[must_use]
pub fn user_handbook() -> ManualDoc {
    let pdf = USER_HANDBOOK_PDF;
    ManualDoc {
        id: "user-handbook".to_owned(),
        title: "Radar System User Handbook".to_owned(),
        description: "Operation and maintenance manual for radar systems".to_owned(),
        sections: vec![
            root(
                "uh-intro",
                "Introduction",
                pdf,
                1,
                "Welcome to the Radar System User Handbook. This manual provides comprehensive guidance for operating and maintaining radar systems.",
                &["uh-overview", "uh-safety"],
            ),
            child(
                "uh-overview",
                "System Overview",
                "uh-intro",
                pdf,
                5,
                "The radar system consists of multiple integrated components working together to provide accurate target detection and tracking capabilities.",
            ),
            child(
                "uh-safety",
                "Safety Guidelines",
                "uh-intro",
                pdf,
                12,
                "Critical safety procedures and precautions that must be followed when operating radar equipment.",
            ),
            root(
                "uh-operation",
                "System Operation",
                pdf,
                20,
                "Detailed procedures for operating the radar system under various conditions.",
                &["uh-startup", "uh-calibration", "uh-monitoring"],
            ),
            child(
                "uh-startup",
                "System Startup Procedures",
                "uh-operation",
                pdf,
                22,
                "Step-by-step procedures for safely starting up the radar system.",
            ),
            child(
                "uh-calibration",
                "Calibration Procedures",
                "uh-operation",
                pdf,
                35,
                "How to perform system calibration to ensure optimal performance.",
            ),
            child(
                "uh-monitoring",
                "System Monitoring",
                "uh-operation",
                pdf,
                48,
                "Monitoring system performance and identifying potential issues.",
            ),
            root(
                "uh-maintenance",
                "Maintenance",
                pdf,
                60,
                "Regular maintenance procedures to keep the system operating efficiently.",
                &[],
            ),
        ],
    }
}

#[must_use]
pub fn technical_manual() -> ManualDoc {
    let pdf = TECHNICAL_MANUAL_PDF;
    ManualDoc {
        id: "technical-manual".to_owned(),
        title: "Radar System Technical Manual".to_owned(),
        description: "Detailed technical specifications and repair procedures".to_owned(),
        sections: vec![
            root(
                "tm-architecture",
                "System Architecture",
                pdf,
                1,
                "Comprehensive overview of the radar system architecture, including hardware and software components.",
                &["tm-hardware", "tm-software", "tm-interfaces"],
            ),
            child(
                "tm-hardware",
                "Hardware Components",
                "tm-architecture",
                pdf,
                8,
                "Detailed specifications and descriptions of all hardware components in the radar system.",
            ),
            child(
                "tm-software",
                "Software Architecture",
                "tm-architecture",
                pdf,
                25,
                "Software modules, algorithms, and data processing workflows.",
            ),
            child(
                "tm-interfaces",
                "System Interfaces",
                "tm-architecture",
                pdf,
                42,
                "Communication protocols and interface specifications.",
            ),
            root(
                "tm-diagnostics",
                "Diagnostics & Troubleshooting",
                pdf,
                55,
                "Advanced diagnostic procedures and troubleshooting guides for technical personnel.",
                &["tm-error-codes", "tm-repair"],
            ),
            child(
                "tm-error-codes",
                "Error Codes Reference",
                "tm-diagnostics",
                pdf,
                58,
                "Complete reference of system error codes and their meanings.",
            ),
            child(
                "tm-repair",
                "Repair Procedures",
                "tm-diagnostics",
                pdf,
                75,
                "Step-by-step repair procedures for common hardware failures.",
            ),
            root(
                "tm-specifications",
                "Technical Specifications",
                pdf,
                95,
                "Complete technical specifications, performance parameters, and operational limits.",
                &[],
            ),
        ],
    }
}

fn root(
    id: &str,
    title: &str,
    document_ref: &str,
    page_number: u32,
    content: &str,
    child_ids: &[&str],
) -> Section {
    Section {
        id: id.to_owned(),
        title: title.to_owned(),
        level: 1,
        parent_id: None,
        document_ref: Some(document_ref.to_owned()),
        page_number: Some(page_number),
        content: Some(content.to_owned()),
        child_ids: child_ids.iter().map(|id| (*id).to_owned()).collect(),
    }
}

fn child(
    id: &str,
    title: &str,
    parent_id: &str,
    document_ref: &str,
    page_number: u32,
    content: &str,
) -> Section {
    Section {
        id: id.to_owned(),
        title: title.to_owned(),
        level: 2,
        parent_id: Some(parent_id.to_owned()),
        document_ref: Some(document_ref.to_owned()),
        page_number: Some(page_number),
        content: Some(content.to_owned()),
        child_ids: Vec::new(),
    }
}
