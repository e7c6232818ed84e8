//! Document display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Document;

#[derive(Tabled)]
struct DocumentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    doc_type: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn format_document_list(documents: &[Document]) -> String {
    if documents.is_empty() {
        return "No documents found.".to_string();
    }

    let outstanding = documents.iter().filter(|d| d.is_outstanding()).count();
    let mut table = Table::new(documents.iter().map(|d| DocumentRow {
        id: d.id.to_string(),
        name: d.name.clone(),
        doc_type: d.doc_type.to_string(),
        date: d.date.to_string(),
        status: d.status.to_string(),
    }));
    table.with(Style::psql());

    format!("{}\n{} document(s), {} outstanding", table, documents.len(), outstanding)
}
