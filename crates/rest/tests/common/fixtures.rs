//! SRU response and MARC record builders.

/// SRU 2.0 response namespace.
pub const SRU_NS: &str = "http://docs.oasis-open.org/ns/search-ws/sruResponse";

/// MARC exchange namespace.
pub const MARC_NS: &str = "info:lc/xmlns/marcxchange-v1";

/// A MARC record; `id` becomes the `001` control field when given.
pub fn marc_record(id: Option<&str>, title: &str) -> String {
    let control = id
        .map(|id| format!(r#"<marcx:controlfield tag="001">{}</marcx:controlfield>"#, id))
        .unwrap_or_default();
    format!(
        r#"<marcx:record xmlns:marcx="{MARC_NS}" format="danMARC2"><marcx:leader>00000n    2200000   4500</marcx:leader><marcx:controlfield tag="004">870970</marcx:controlfield>{control}<marcx:datafield tag="245" ind1="0" ind2="0"><marcx:subfield code="a">{title}</marcx:subfield></marcx:datafield></marcx:record>"#
    )
}

/// An SRU `record` element with the given escaping and `recordData` content.
pub fn sru_record(escaping: &str, data: &str, position: usize) -> String {
    format!(
        r#"<srw:record>
  <srw:recordSchema>info:lc/xmlns/marcxchange-v1</srw:recordSchema>
  <srw:recordXMLEscaping>{escaping}</srw:recordXMLEscaping>
  <srw:recordData>{data}</srw:recordData>
  <srw:recordPosition>{position}</srw:recordPosition>
</srw:record>"#
    )
}

/// An XML-escaped record holding a MARC record with `001` = `id`.
pub fn xml_record(id: &str, position: usize) -> String {
    sru_record("xml", &marc_record(Some(id), "Hobbitten"), position)
}

/// A complete `searchRetrieveResponse`.
pub fn sru_response(hits: u64, records: &[String]) -> String {
    let records = if records.is_empty() {
        String::new()
    } else {
        format!("<srw:records>{}</srw:records>", records.concat())
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<srw:searchRetrieveResponse xmlns:srw="{SRU_NS}">
  <srw:version>2.0</srw:version>
  <srw:numberOfRecords>{hits}</srw:numberOfRecords>
  {records}
</srw:searchRetrieveResponse>"#
    )
}
