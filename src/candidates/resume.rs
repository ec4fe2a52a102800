use uuid::Uuid;

pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;
pub const PRESIGN_TTL_SECS: u64 = 10 * 60;

pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "application/pdf" => Some("pdf"),
        "application/msword" => Some("doc"),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => Some("docx"),
        "text/plain" => Some("txt"),
        _ => None,
    }
}

pub fn object_key(candidate_id: Uuid, ext: &str) -> String {
    format!("resumes/{}/{}.{}", candidate_id, Uuid::new_v4(), ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_resume_types() {
        assert_eq!(extension_for("application/pdf"), Some("pdf"));
        assert_eq!(extension_for("application/msword"), Some("doc"));
        assert_eq!(
            extension_for("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            Some("docx")
        );
        assert_eq!(extension_for("text/plain"), Some("txt"));
        assert_eq!(extension_for("image/png"), None);
        assert_eq!(extension_for("application/octet-stream"), None);
    }

    #[test]
    fn keys_are_namespaced_by_candidate() {
        let id = Uuid::new_v4();
        let key = object_key(id, "pdf");
        assert!(key.starts_with(&format!("resumes/{id}/")));
        assert!(key.ends_with(".pdf"));
        assert_ne!(key, object_key(id, "pdf"));
    }
}
