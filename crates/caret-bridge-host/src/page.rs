//! The HTML page that hosts the editable container.

use caret_bridge_core::CONTENT_ELEMENT_ID;

use crate::config::HostConfig;

/// Renders the host page around a piece of editable content.
#[derive(Debug, Clone, PartialEq)]
pub struct PageTemplate {
    stylesheet: String,
    script: String,
    min_height_px: u32,
}

impl PageTemplate {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            stylesheet: config.stylesheet.clone(),
            script: config.script.clone(),
            min_height_px: config.content_min_height_px(),
        }
    }

    /// Override the container's minimum height, in device pixels.
    pub fn with_min_height_px(mut self, min_height_px: u32) -> Self {
        self.min_height_px = min_height_px;
        self
    }

    pub fn min_height_px(&self) -> u32 {
        self.min_height_px
    }

    /// Render a full page. `content` is inserted into the container verbatim.
    pub fn render(&self, content: &str) -> String {
        let mut html = String::with_capacity(content.len() + 512);

        html.push_str("<html>\n");
        html.push_str("  <head>\n");
        html.push_str(
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n",
        );
        html.push_str(&format!(
            "    <link href=\"{}\" rel=\"stylesheet\" type=\"text/css\"/>\n",
            self.stylesheet
        ));
        html.push_str(&format!("    <script src=\"{}\"></script>\n", self.script));
        html.push_str("  </head>\n");
        html.push_str("  <body>\n");
        html.push_str(&format!(
            "    <div id=\"{}\" contentEditable=\"true\" style=\"min-height:{}px;\">{}</div>\n",
            CONTENT_ELEMENT_ID, self.min_height_px, content
        ));
        html.push_str("  </body>\n");
        html.push_str("</html>");

        html
    }
}
