/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth gate / access log / audit adapter / transport layers
 */
pub mod access_log;
pub mod audit;
pub mod auth;
pub mod http;
