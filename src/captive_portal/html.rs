//! 内嵌 HTML 静态资源

/// 配网页面，`GET /` 原样返回
pub const INDEX_HTML: &str = r#"
<!DOCTYPE html>
<html>
<head>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
        body {
            background-color: aqua;
            font-family: sans-serif;
        }
    
        form {
            width:50%;
            margin: auto;
        }
        
        input {
            width:100%;
            margin:auto;
            font-size:20px;
            min-height:5vh;
        }
        
        h1 {
            text-align: center;
        }

        @media screen and (max-width: 480px) {
            form {
                width:90%;
            }
            input {
                width:100%;
            }
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>WIICMATH<br>WiFi Configuration</h1>
        <form action="/configure" method="POST">
            <label for="ssid">WiFi SSID:</label><br>
            <input type="text" id="ssid" name="ssid"><br><br>
            <label for="password">WiFi Password:</label><br>
            <input type="password" id="password" name="password"><br><br>
            <input type="submit" value="Submit">
        </form>
    </div>
</body>
</html>
"#;

/// `POST /configure` 保存成功后返回的页面
pub const SAVED_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta name="viewport" content="width=device-width, initial-scale=1">
</head>
<body style="background-color: aqua; font-family: sans-serif; text-align: center;">
    <h1>WIICMATH<br>WiFi Configuration</h1>
    <p>Configuration saved. Rebooting...</p>
</body>
</html>
"#;

/// 表单提交地址
pub const FORM_ACTION: &str = "/configure";
/// SSID 输入框的字段名
pub const SSID_FIELD: &str = "ssid";
/// 密码输入框的字段名
pub const PASSWORD_FIELD: &str = "password";

/// 配网页面的全部字节，长度即 `index_html().len()`
pub fn index_html() -> &'static [u8] {
    INDEX_HTML.as_bytes()
}
