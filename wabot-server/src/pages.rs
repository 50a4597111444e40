//! HTML pages for the link flow

/// QR rendering service; the raw payload is appended as `data`
pub const QR_IMAGE_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/?size=300x300&data=";

const BASE_STYLE: &str = r#"        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif;
            display: flex;
            justify-content: center;
            align-items: center;
            min-height: 100vh;
            background: #fafafa;
        }
        .container {
            background: #fff;
            padding: 40px;
            border-radius: 8px;
            box-shadow: 0 2px 8px rgba(0,0,0,0.1);
            text-align: center;
        }
        h2 {
            font-size: 18px;
            font-weight: 500;
            color: #2d2d2d;
        }
        .info {
            color: #666;
            font-size: 14px;
        }
        a {
            color: #1976d2;
            text-decoration: none;
            font-weight: 500;
        }
        a:hover { text-decoration: underline; }
"#;

const CONNECTED_STYLE: &str = r#"        .success { color: #2d2d2d; font-size: 20px; }
        .success::before {
            content: '✓';
            display: block;
            font-size: 48px;
            color: #4caf50;
            margin-bottom: 16px;
        }
"#;

const QR_STYLE: &str = r#"        h2 { margin-bottom: 24px; }
        img { border: 1px solid #e0e0e0; border-radius: 4px; }
        .info { margin-top: 24px; }
"#;

const PAIRING_STYLE: &str = r#"        .container { min-width: 400px; }
        h2 { margin-bottom: 8px; }
        .info { margin-bottom: 20px; }
        input {
            padding: 10px 12px;
            width: 100%;
            font-size: 15px;
            border: 1px solid #d0d0d0;
            border-radius: 4px;
            margin-bottom: 16px;
        }
        input:focus { outline: none; border-color: #1976d2; }
        button {
            padding: 10px 24px;
            background: #1976d2;
            color: white;
            border: none;
            border-radius: 4px;
            font-size: 15px;
            cursor: pointer;
            font-weight: 500;
        }
        button:hover { background: #1565c0; }
        .code {
            font-size: 32px;
            font-weight: 600;
            color: #2d2d2d;
            margin: 24px 0;
            letter-spacing: 4px;
        }
        .error { color: #d32f2f; margin-top: 16px; }
        .back { margin-top: 24px; }
"#;

const PAIRING_BODY: &str = r#"        <h2>Get Pairing Code</h2>
        <div class="info">Enter your phone number with country code</div>
        <input type="text" id="phone" placeholder="e.g., 1234567890" maxlength="15">
        <button onclick="getPairingCode()">Get Code</button>
        <div id="result"></div>
        <div class="back">
            <a href="/qr">Back to QR Code</a>
        </div>
        <script>
            async function getPairingCode() {
                const phone = document.getElementById('phone').value.replace(/\D/g, '');
                if (!phone) {
                    alert('Please enter a valid phone number');
                    return;
                }

                const response = await fetch('/pairing', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ phone_number: phone })
                });

                const data = await response.json();
                const result = document.getElementById('result');

                if (data.success) {
                    result.innerHTML = '<div class="code">' + data.pairing_code + '</div>'
                        + '<div class="info">Enter this code in WhatsApp &gt; Linked Devices &gt; Link a Device</div>';
                } else if (data.connected) {
                    result.innerHTML = '<div class="info">' + data.message + '</div>';
                } else {
                    result.innerHTML = '<div class="error">Error: ' + data.error + '</div>';
                }
            }
        </script>
"#;

fn layout(title: &str, style: &str, refresh_secs: Option<u32>, body: &str) -> String {
    let refresh = refresh_secs
        .map(|secs| format!("    <meta http-equiv=\"refresh\" content=\"{secs}\">\n"))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n    <title>{title}</title>\n    <style>\n{BASE_STYLE}{style}    </style>\n{refresh}</head>\n<body>\n    <div class=\"container\">\n{body}    </div>\n</body>\n</html>\n"
    )
}

/// Image URL for a QR payload. The payload is embedded verbatim.
pub fn qr_image_url(qr_code: &str) -> String {
    format!("{QR_IMAGE_ENDPOINT}{qr_code}")
}

pub fn connected_page() -> String {
    layout(
        "WhatsApp Bot",
        CONNECTED_STYLE,
        None,
        "        <div class=\"success\">Connected Successfully</div>\n",
    )
}

pub fn waiting_page() -> String {
    layout("WhatsApp Bot", "", Some(2), "        <h2>Waiting for QR Code...</h2>\n")
}

pub fn qr_page(qr_code: &str) -> String {
    let body = format!(
        "        <h2>Scan QR Code with WhatsApp</h2>\n        <img src=\"{}\" alt=\"QR Code\">\n        <div class=\"info\">Or use pairing code</div>\n        <a href=\"/pairing\">Get Pairing Code</a>\n",
        qr_image_url(qr_code)
    );
    layout("WhatsApp Bot - QR Code", QR_STYLE, Some(5), &body)
}

pub fn pairing_page() -> String {
    layout("WhatsApp Bot - Pairing Code", PAIRING_STYLE, None, PAIRING_BODY)
}
