//! Basic nsdebug usage
//!
//! Run with: DEBUG="http*,-http:noisy" cargo run --example basic_usage

use nsdebug::{args, Arg, RenderContext};
use serde_json::json;

fn main() -> nsdebug::Result<()> {
    let registry = nsdebug::init()?;
    if registry.spec().is_empty() {
        registry.enable("http*,-http:noisy")?;
    }

    // Custom verb: %h renders its argument as a hex number
    registry.register_formatter('h', |value: &Arg, _: &str, _: &RenderContext| {
        value
            .as_number()
            .map(|n| format!("{:#x}", n as i64))
            .unwrap_or_else(|| "NaN".to_string())
    });

    let http = registry.create("http");
    let req = http.ns("req");
    let noisy = http.ns("noisy");

    http.info("listening on port %d", args![8080]);
    req.debug("headers %o", args![json!({ "host": "localhost", "accept": "*/*" })]);
    req.debug("body %12.2B", args![b"{\"user\":\"steve\"}"]);
    req.warn("slow request, flags %h", args![255]);
    noisy.info("you will not see this", args![]);

    let previous = registry.disable();
    http.error("silenced", args![]);
    registry.enable(&previous)?;
    http.error("back with '%s'", args![previous]);

    Ok(())
}
