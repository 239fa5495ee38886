use uuid::Uuid;

pub(crate) const CODE_LEN: usize = 8;

pub(crate) fn generate_quiz_code() -> String {
    let mut code = Uuid::new_v4().simple().to_string();
    code.truncate(CODE_LEN);
    code.make_ascii_uppercase();
    code
}

pub(crate) fn normalize_quiz_code(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}
