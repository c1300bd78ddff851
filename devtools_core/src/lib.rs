use console_error_panic_hook::set_once as set_panic_hook;
use js_sys::{Object, Reflect, Uint8Array};
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod chmod;
pub mod color;
pub mod convert;
pub mod datetime;
pub mod encoding;
pub mod error;
pub mod hashing;
pub mod ids;
pub mod json_diff;
pub mod jwt;
pub mod list_converter;
pub mod network;
pub mod numbers;
pub mod options;
pub mod otp;
pub mod password;
pub mod random;
pub mod text;
pub mod web;

use error::ToolError;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    set_panic_hook();
    // a second init (hot reload) keeps the first logger
    let _ = console_log::init_with_level(log::Level::Info);
}

fn js_error(err: ToolError) -> JsValue {
    log::warn!("tool call rejected: {err}");
    JsValue::from_str(&err.to_string())
}

fn respond<T: Serialize>(result: error::Result<T>) -> Result<JsValue, JsValue> {
    result.map_err(js_error).and_then(|value| options::to_js(&value))
}

#[wasm_bindgen]
pub fn encode_base64(text: &str, options: JsValue) -> Result<String, JsValue> {
    let options: encoding::Base64Options = options::from_js(options)?;
    Ok(encoding::encode_base64_text(text, options))
}

#[wasm_bindgen]
pub fn decode_base64(text: &str, options: JsValue) -> Result<String, JsValue> {
    let options: encoding::Base64Options = options::from_js(options)?;
    encoding::decode_base64_text(text, options).map_err(js_error)
}

#[wasm_bindgen]
pub fn is_valid_base64(text: &str, options: JsValue) -> Result<bool, JsValue> {
    let options: encoding::Base64Options = options::from_js(options)?;
    Ok(encoding::is_valid_base64(text, options))
}

#[wasm_bindgen]
pub fn encode_base64_file(data: &[u8], mime: &str) -> String {
    encoding::encode_data_url(data, mime)
}

/// Returns `{ mime, extension, bytes }` with `bytes` as a `Uint8Array`.
#[wasm_bindgen]
pub fn decode_base64_file(text: &str) -> Result<JsValue, JsValue> {
    let file = encoding::decode_data_url(text).map_err(js_error)?;
    let out = Object::new();
    Reflect::set(&out, &"mime".into(), &file.mime.as_str().into())?;
    Reflect::set(&out, &"extension".into(), &file.extension.as_str().into())?;
    Reflect::set(
        &out,
        &"bytes".into(),
        &Uint8Array::from(file.bytes.as_slice()).into(),
    )?;
    Ok(out.into())
}

#[wasm_bindgen]
pub fn convert_case(text: &str) -> Result<JsValue, JsValue> {
    options::to_js(&text::convert_case(text))
}

#[wasm_bindgen]
pub fn text_statistics(text: &str) -> Result<JsValue, JsValue> {
    options::to_js(&text::text_statistics(text))
}

#[wasm_bindgen]
pub fn text_to_nato(text: &str) -> String {
    text::text_to_nato(text)
}

#[wasm_bindgen]
pub fn text_to_binary(text: &str, separator: &str) -> String {
    text::text_to_binary(text, separator)
}

#[wasm_bindgen]
pub fn binary_to_text(bits: &str) -> Result<String, JsValue> {
    text::binary_to_text(bits).map_err(js_error)
}

#[wasm_bindgen]
pub fn text_to_unicode(text: &str) -> String {
    text::text_to_unicode(text)
}

#[wasm_bindgen]
pub fn unicode_to_text(escaped: &str) -> String {
    text::unicode_to_text(escaped)
}

#[wasm_bindgen]
pub fn escape_html(text: &str) -> String {
    text::escape_html(text)
}

#[wasm_bindgen]
pub fn unescape_html(text: &str) -> String {
    text::unescape_html(text)
}

#[wasm_bindgen]
pub fn url_encode(input: &str) -> String {
    text::url_encode(input)
}

#[wasm_bindgen]
pub fn url_decode(input: &str) -> Result<String, JsValue> {
    text::url_decode(input).map_err(js_error)
}

#[wasm_bindgen]
pub fn slugify(text: &str) -> String {
    text::slugify(text)
}

#[wasm_bindgen]
pub fn numeronym(word: &str) -> String {
    text::numeronym(word)
}

#[wasm_bindgen]
pub fn obfuscate(text: &str, options: JsValue) -> Result<String, JsValue> {
    let options: text::ObfuscateOptions = options::from_js(options)?;
    Ok(text::obfuscate(text, &options))
}

#[wasm_bindgen]
pub fn hash_text(text: &str, encoding: &str) -> Result<JsValue, JsValue> {
    let encoding = hashing::DigestEncoding::parse(encoding).map_err(js_error)?;
    options::to_js(&hashing::hash_text(text, encoding))
}

#[wasm_bindgen]
pub fn hmac_text(
    text: &str,
    secret: &str,
    algorithm: &str,
    encoding: &str,
) -> Result<String, JsValue> {
    let encoding = hashing::DigestEncoding::parse(encoding).map_err(js_error)?;
    hashing::hmac_text(text, secret, algorithm, encoding).map_err(js_error)
}

#[wasm_bindgen]
pub fn generate_uuids(
    version: &str,
    count: usize,
    namespace: &str,
    name: &str,
) -> Result<JsValue, JsValue> {
    respond(ids::generate_uuids(version, count, namespace, name))
}

#[wasm_bindgen]
pub fn inspect_uuid(text: &str) -> Result<JsValue, JsValue> {
    respond(ids::inspect_uuid(text))
}

#[wasm_bindgen]
pub fn generate_ulids(count: usize) -> Result<JsValue, JsValue> {
    respond(ids::generate_ulids(count))
}

/// Milliseconds since the epoch, as a JS number.
#[wasm_bindgen]
pub fn decode_ulid_timestamp(ulid: &str) -> Result<f64, JsValue> {
    ids::decode_ulid_timestamp(ulid)
        .map(|ms| ms as f64)
        .map_err(js_error)
}

#[wasm_bindgen]
pub fn generate_token(options: JsValue) -> Result<String, JsValue> {
    let options: ids::TokenOptions = options::from_js(options)?;
    ids::generate_token(&options).map_err(js_error)
}

#[wasm_bindgen]
pub fn convert_formats(from: &str, to: &str, input: &str) -> Result<String, JsValue> {
    convert::convert_formats(from, to, input).map_err(js_error)
}

#[wasm_bindgen]
pub fn format_content(format: &str, input: &str, minify: bool) -> Result<String, JsValue> {
    convert::format_content(format, input, minify).map_err(js_error)
}

#[wasm_bindgen]
pub fn format_json(input: &str, options: JsValue) -> Result<String, JsValue> {
    let options: convert::JsonFormatOptions = options::from_js(options)?;
    convert::format_json(input, options).map_err(js_error)
}

#[wasm_bindgen]
pub fn minify_json(input: &str) -> Result<String, JsValue> {
    convert::minify_json(input).map_err(js_error)
}

#[wasm_bindgen]
pub fn json_to_csv(input: &str) -> Result<String, JsValue> {
    convert::json_to_csv(input).map_err(js_error)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiffReport {
    has_differences: bool,
    summary: json_diff::DiffSummary,
    root: json_diff::DiffNode,
}

#[wasm_bindgen]
pub fn diff_json(left: &str, right: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let options: json_diff::JsonDiffOptions = options::from_js(options)?;
    respond(json_diff::diff_json(left, right, options).map(|root| DiffReport {
        has_differences: json_diff::has_differences(&root),
        summary: json_diff::summarize(&root),
        root,
    }))
}

#[wasm_bindgen]
pub fn convert_list(input: &str, options: JsValue) -> Result<String, JsValue> {
    let options: list_converter::ListConverterOptions = options::from_js(options)?;
    Ok(list_converter::convert_list(input, &options))
}

#[wasm_bindgen]
pub fn ipv4_subnet(input: &str) -> Result<JsValue, JsValue> {
    respond(network::ipv4_subnet(input))
}

#[wasm_bindgen]
pub fn ipv4_info(input: &str) -> Result<JsValue, JsValue> {
    respond(network::ipv4_info(input))
}

#[wasm_bindgen]
pub fn expand_ipv4_range(start: &str, end: &str) -> Result<JsValue, JsValue> {
    respond(network::expand_ipv4_range(start, end))
}

#[wasm_bindgen]
pub fn generate_macs(options: JsValue) -> Result<JsValue, JsValue> {
    let options: network::MacOptions = options::from_js(options)?;
    respond(network::generate_macs(&options))
}

#[wasm_bindgen]
pub fn ipv6_ula(mac: &str) -> Result<JsValue, JsValue> {
    respond(network::ipv6_ula(mac))
}

#[wasm_bindgen]
pub fn random_port() -> Result<u16, JsValue> {
    network::random_port().map_err(js_error)
}

#[wasm_bindgen]
pub fn chmod_info(input: &str) -> Result<JsValue, JsValue> {
    respond(chmod::chmod_info(input))
}

/// Same report as `chmod_info`, built from the checkbox matrix.
#[wasm_bindgen]
pub fn chmod_from_permissions(permissions: JsValue) -> Result<JsValue, JsValue> {
    let perms: chmod::Permissions = options::from_js(permissions)?;
    respond(chmod::chmod_info(&chmod::to_octal(perms)))
}

#[wasm_bindgen]
pub fn analyse_password(
    password: &str,
    guesses_per_second: Option<f64>,
) -> Result<JsValue, JsValue> {
    let rate = guesses_per_second.unwrap_or(password::DEFAULT_GUESSES_PER_SECOND);
    options::to_js(&password::analyse_password(password, rate))
}

#[wasm_bindgen]
pub fn jwt_decode(token: &str) -> Result<JsValue, JsValue> {
    respond(jwt::jwt_decode(token))
}

#[wasm_bindgen]
pub fn jwt_encode(payload: &str, secret: &str, algorithm: &str) -> Result<String, JsValue> {
    jwt::jwt_encode(payload, secret, algorithm).map_err(js_error)
}

#[wasm_bindgen]
pub fn generate_totp_secret() -> Result<String, JsValue> {
    otp::generate_totp_secret().map_err(js_error)
}

#[wasm_bindgen]
pub fn totp(options: JsValue) -> Result<JsValue, JsValue> {
    let options: otp::TotpOptions = options::from_js(options)?;
    respond(otp::totp(&options))
}

/// `counter` arrives as a JS number; it must be a non-negative safe integer.
#[wasm_bindgen]
pub fn hotp(secret: &str, counter: f64, digits: u32) -> Result<String, JsValue> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if !(0.0..=MAX_SAFE_INTEGER).contains(&counter) || counter.fract() != 0.0 {
        return Err(js_error(ToolError::OutOfRange(format!(
            "counter must be a non-negative integer, got {counter}"
        ))));
    }
    let key = otp::decode_secret(secret).map_err(js_error)?;
    otp::hotp(&key, counter as u64, digits).map_err(js_error)
}

#[wasm_bindgen]
pub fn otpauth_uri(secret: &str, issuer: &str, account: &str, period: u32, digits: u32) -> String {
    otp::otpauth_uri(secret, issuer, account, u64::from(period), digits)
}

#[wasm_bindgen]
pub fn convert_timestamp(kind: &str, input: &str) -> Result<JsValue, JsValue> {
    respond(datetime::convert_timestamp(kind, input))
}

#[wasm_bindgen]
pub fn convert_base(value: &str, from_base: &str) -> Result<JsValue, JsValue> {
    respond(numbers::convert_base(value, from_base))
}

#[wasm_bindgen]
pub fn convert_to_base(value: &str, from_base: u32, to_base: u32) -> Result<String, JsValue> {
    numbers::convert_to_base(value, from_base, to_base).map_err(js_error)
}

#[wasm_bindgen]
pub fn to_roman(number: u32) -> Result<String, JsValue> {
    numbers::to_roman(number).map_err(js_error)
}

#[wasm_bindgen]
pub fn from_roman(text: &str) -> Result<u32, JsValue> {
    numbers::from_roman(text).map_err(js_error)
}

#[wasm_bindgen]
pub fn convert_temperature(value: f64, unit: &str) -> Result<JsValue, JsValue> {
    respond(numbers::convert_temperature(value, unit))
}

#[wasm_bindgen]
pub fn percentage(x: f64, y: f64) -> Result<JsValue, JsValue> {
    options::to_js(&numbers::percentage(x, y))
}

#[wasm_bindgen]
pub fn convert_color(input: &str) -> Result<JsValue, JsValue> {
    respond(color::convert_color(input))
}

#[wasm_bindgen]
pub fn parse_url(input: &str) -> Result<JsValue, JsValue> {
    respond(web::parse_url(input))
}

#[wasm_bindgen]
pub fn basic_auth_header(username: &str, password: &str) -> String {
    web::basic_auth_header(username, password)
}

#[wasm_bindgen]
pub fn http_status(query: &str) -> Result<JsValue, JsValue> {
    options::to_js(&web::http_status(query))
}
