//! Portal page shells served behind the route guard.
//!
//! The pages carry no auth logic of their own; the guard decides whether a
//! request gets here and the page controllers run on the client side.

use axum::response::Html;

fn shell(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html lang=\"es\"><head><meta charset=\"utf-8\"><title>{title} · Portal Pensionados</title></head>\
         <body><main>{body}</main></body></html>"
    ))
}

pub async fn home() -> Html<String> {
    shell("Inicio", r#"<h1>Portal Pensionados</h1><a href="/login">Ingresar</a>"#)
}

pub async fn login() -> Html<String> {
    shell(
        "Ingreso",
        r#"<h1>Bienvenido al Portal Pensionados</h1><p>Ingresa tu usuario y contraseña para continuar.</p>"#,
    )
}

pub async fn dashboard() -> Html<String> {
    shell("Dashboard", r#"<h1>Bienvenido al área protegida</h1><a href="/me">Mi Perfil</a>"#)
}

pub async fn profile() -> Html<String> {
    shell("Mi Perfil", "<h1>Mi Perfil</h1>")
}
