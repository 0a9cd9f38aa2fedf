use crate::intent::{Request, keys};

/// 结果清洗结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitized {
    Unchanged,
    /// 名义成功但没有载荷，已改为取消
    Canceled,
}

/// 载荷是否实际为空
///
/// 单项引用缺失、批量列表中没有任何非空引用、且不带流和内容注解额外数据时为空。
pub fn is_empty_payload(payload: &Request) -> bool {
    payload.data.is_none()
        && !payload
            .clip_data
            .as_ref()
            .map(|clip| clip.has_uri())
            .unwrap_or(false)
        && !payload.has_extra(keys::EXTRA_STREAM)
        && !payload.has_extra(keys::EXTRA_CONTENT_ANNOTATIONS)
}

/// 仅在成功码且载荷存在但为空时，将结果改为（取消，无载荷）
pub fn sanitize(code: &mut i32, payload: &mut Option<Request>) -> Sanitized {
    if *code != keys::RESULT_OK {
        return Sanitized::Unchanged;
    }
    if !payload.as_ref().map(is_empty_payload).unwrap_or(false) {
        return Sanitized::Unchanged;
    }
    *code = keys::RESULT_CANCELED;
    *payload = None;
    Sanitized::Canceled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{ClipData, ClipItem};

    #[test]
    fn test_empty_success_becomes_canceled() {
        let mut code = keys::RESULT_OK;
        let mut payload = Some(Request::default());

        assert_eq!(sanitize(&mut code, &mut payload), Sanitized::Canceled);
        assert_eq!(code, keys::RESULT_CANCELED);
        assert!(payload.is_none());
    }

    #[test]
    fn test_single_reference_untouched() {
        let mut code = keys::RESULT_OK;
        let mut payload = Some(Request::default().with_data("content://media/external/images/1"));
        let before = payload.clone();

        assert_eq!(sanitize(&mut code, &mut payload), Sanitized::Unchanged);
        assert_eq!(code, keys::RESULT_OK);
        assert_eq!(payload, before);
    }

    #[test]
    fn test_clip_data_without_uris_is_empty() {
        let empty_clip = Request::default().with_clip_data(ClipData::new(vec![ClipItem {
            uri: None,
            text: Some("caption".to_string()),
        }]));
        assert!(is_empty_payload(&empty_clip));

        let no_items = Request::default().with_clip_data(ClipData::default());
        assert!(is_empty_payload(&no_items));

        let populated = Request::default().with_clip_data(ClipData::new(vec![
            ClipItem::default(),
            ClipItem::uri("content://media/external/images/2"),
        ]));
        assert!(!is_empty_payload(&populated));
    }

    #[test]
    fn test_stream_and_annotation_extras_count_as_content() {
        let stream = Request::default().with_extra(keys::EXTRA_STREAM, "content://x/1");
        assert!(!is_empty_payload(&stream));

        let annotations = Request::default()
            .with_extra(keys::EXTRA_CONTENT_ANNOTATIONS, &["sticker"][..]);
        assert!(!is_empty_payload(&annotations));
    }

    #[test]
    fn test_non_success_codes_untouched() {
        let mut code = keys::RESULT_CANCELED;
        let mut payload = Some(Request::default());

        assert_eq!(sanitize(&mut code, &mut payload), Sanitized::Unchanged);
        assert_eq!(code, keys::RESULT_CANCELED);
        assert_eq!(payload, Some(Request::default()));

        let mut code = 1;
        let mut payload = Some(Request::default());
        assert_eq!(sanitize(&mut code, &mut payload), Sanitized::Unchanged);
        assert_eq!(code, 1);
    }

    #[test]
    fn test_absent_payload_untouched() {
        let mut code = keys::RESULT_OK;
        let mut payload = None;

        assert_eq!(sanitize(&mut code, &mut payload), Sanitized::Unchanged);
        assert_eq!(code, keys::RESULT_OK);
    }
}
