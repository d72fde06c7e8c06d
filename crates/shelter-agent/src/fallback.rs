//! Offline fallback page.

use shelter_core::Response;

/// Minimal page synthesized when an HTML navigation fails and no cached
/// fallback exists. Equivalent in rendering to the cached `/offline.html`,
/// not byte-identical.
const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Offline</title>
<style>
body { font-family: system-ui, sans-serif; margin: 0; display: flex; min-height: 100vh;
       align-items: center; justify-content: center; background: #f5f5f5; color: #333; }
main { text-align: center; padding: 2rem; }
h1 { font-size: 1.5rem; }
</style>
</head>
<body>
<main>
<h1>You are offline</h1>
<p>This page is not available without a connection.</p>
<p>Previously viewed pages and saved emergency data remain accessible.</p>
</main>
</body>
</html>
"#;

/// Build the synthesized offline response.
pub fn synthesized_offline() -> Response {
    Response::ok(OFFLINE_PAGE).with_header("content-type", "text/html; charset=utf-8")
}
