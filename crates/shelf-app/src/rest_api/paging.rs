use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: u32,
    /// Larger page sizes are clamped to this value
    pub max_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: 25,
            max_size: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per: u32,
    pub total: u64,
}

impl Pagination {
    pub fn new(page: u32, per: u32, total: u64) -> Self {
        Self { page, per, total }
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per.max(1) as u64)
    }

    pub fn next_page(&self) -> Option<u32> {
        if (self.page as u64) < self.total_pages() {
            Some(self.page + 1)
        } else {
            None
        }
    }

    /// Previous page, past the end it is the last existing page
    pub fn prev_page(&self) -> Option<u32> {
        if self.page > 1 {
            let last = u32::try_from(self.total_pages()).unwrap_or(u32::MAX);
            Some((self.page - 1).min(last)).filter(|p| *p > 0)
        } else {
            None
        }
    }

    /// `Link` header value, `None` when everything fits on one page.
    ///
    /// `base` is absolute URL of the resource collection, query pairs of the
    /// original request are kept in order, only `page` and `per` are replaced.
    pub fn link_header(&self, base: &str, query: &str) -> Option<String> {
        if self.total_pages() <= 1 {
            return None;
        }
        let links: Vec<String> = [(self.next_page(), "next"), (self.prev_page(), "prev")]
            .into_iter()
            .filter_map(|(page, rel)| {
                page.map(|page| format!("<{}>; rel=\"{rel}\"", self.page_url(base, query, page)))
            })
            .collect();

        if links.is_empty() {
            None
        } else {
            Some(links.join(", "))
        }
    }

    fn page_url(&self, base: &str, query: &str, page: u32) -> String {
        let page = page.to_string();
        let per = self.per.to_string();
        let mut has_page = false;
        let mut has_per = false;
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                // repeated page/per emitted once, at first occurrence
                "page" if has_page => {}
                "per" if has_per => {}
                "page" => {
                    has_page = true;
                    serializer.append_pair("page", &page);
                }
                "per" => {
                    has_per = true;
                    serializer.append_pair("per", &per);
                }
                _ => {
                    serializer.append_pair(&key, &value);
                }
            }
        }
        if !has_page {
            serializer.append_pair("page", &page);
        }
        if !has_per {
            serializer.append_pair("per", &per);
        }
        format!("{base}?{}", serializer.finish())
    }
}
