//! 分段状态机 - 业务能力层
//!
//! 按页序消费分类结论，维护"当前题号 / 当前小问"指针和续页计数，
//! 把每页图片累积到对应的 [`QuestionKey`] 下。
//!
//! [`SegmentationState::advance`] 是函数式更新：拿走旧状态、返回新状态，
//! 没有任何全局可变状态，所以不同文档可以并行处理，但同一文档内必须严格按页序推进。

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{DocVariant, ExamIdentity, ImageHandle, Page, QuestionKey};
use crate::services::page_classifier::{BoundaryRule, ClassificationVerdict, PageClassifier};

/// 已累积的一页
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulatedPage {
    pub page_index: usize,
    pub image: ImageHandle,
}

impl From<Page> for AccumulatedPage {
    fn from(page: Page) -> Self {
        Self {
            page_index: page.index,
            image: page.image,
        }
    }
}

/// 单个文档处理期间的分段状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentationState {
    current_question: Option<u32>,
    current_subpart: Option<char>,
    continuation_counts: HashMap<QuestionKey, u32>,
    /// 插入顺序即首次出现顺序；每个键下的页按页序排列
    accumulated: IndexMap<QuestionKey, Vec<AccumulatedPage>>,
    /// 第一个边界出现之前的续页
    unassigned: Vec<AccumulatedPage>,
}

impl SegmentationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_question(&self) -> Option<u32> {
        self.current_question
    }

    pub fn current_subpart(&self) -> Option<char> {
        self.current_subpart
    }

    pub fn current_key(&self) -> Option<QuestionKey> {
        self.current_question.map(|number| QuestionKey {
            number,
            sub_part: self.current_subpart,
        })
    }

    pub fn continuation_count(&self, key: &QuestionKey) -> Option<u32> {
        self.continuation_counts.get(key).copied()
    }

    pub fn accumulated(&self) -> &IndexMap<QuestionKey, Vec<AccumulatedPage>> {
        &self.accumulated
    }

    pub fn unassigned(&self) -> &[AccumulatedPage] {
        &self.unassigned
    }

    /// 按一页的分类结论推进状态
    pub fn advance(mut self, page: Page, verdict: ClassificationVerdict) -> Self {
        match verdict {
            ClassificationVerdict::Skip => return self,
            ClassificationVerdict::NewQuestion(number) => {
                self.current_question = Some(number);
                self.current_subpart = None;
                self.open(QuestionKey::question(number), page);
            }
            ClassificationVerdict::NewSubpart(number, letter) => {
                self.current_question = Some(number);
                self.current_subpart = Some(letter);
                self.open(QuestionKey::subpart(number, letter), page);
            }
            ClassificationVerdict::AlternativeMethod(number) => {
                // 小问保持不变，只在题号不同时切换题号
                if self.current_question != Some(number) {
                    self.current_question = Some(number);
                }
                let key = QuestionKey {
                    number,
                    sub_part: self.current_subpart,
                };
                self.extend(key, page);
            }
            ClassificationVerdict::Continuation => match self.current_key() {
                Some(key) => self.extend(key, page),
                None => self.unassigned.push(page.into()),
            },
        }
        self
    }

    /// 这一页在推进之后归属到哪里
    pub fn assignment_after(&self, verdict: ClassificationVerdict) -> PageAssignment {
        if verdict == ClassificationVerdict::Skip {
            return PageAssignment::Skipped;
        }
        match self.current_key() {
            Some(key) => PageAssignment::Question(key),
            None => PageAssignment::Unassigned,
        }
    }

    fn open(&mut self, key: QuestionKey, page: Page) {
        self.continuation_counts.entry(key).or_insert(0);
        self.accumulated.entry(key).or_default().push(page.into());
    }

    fn extend(&mut self, key: QuestionKey, page: Page) {
        *self.continuation_counts.entry(key).or_insert(0) += 1;
        self.accumulated.entry(key).or_default().push(page.into());
    }

    fn finish(self, trace: Vec<PageTrace>) -> SegmentationOutcome {
        SegmentationOutcome {
            accumulated: self.accumulated,
            unassigned: self.unassigned,
            trace,
        }
    }
}

/// 单页的最终归属
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum PageAssignment {
    Question(QuestionKey),
    Unassigned,
    Skipped,
}

/// 每页一条的处理轨迹
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTrace {
    pub page_index: usize,
    pub verdict: ClassificationVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<BoundaryRule>,
    pub assignment: PageAssignment,
}

/// 页流结束后的终态，交给记录组装器
///
/// 续页计数只在状态机内部使用；图片命名用的续页序号是页在该键列表中的位置，
/// 这样另解切换题号时新键的第一页仍是 `_3a.png` 而不是 `_sub01`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationOutcome {
    pub accumulated: IndexMap<QuestionKey, Vec<AccumulatedPage>>,
    pub unassigned: Vec<AccumulatedPage>,
    pub trace: Vec<PageTrace>,
}

impl SegmentationOutcome {
    pub fn skipped_pages(&self) -> usize {
        self.trace
            .iter()
            .filter(|t| t.assignment == PageAssignment::Skipped)
            .count()
    }
}

/// 单文档分段驱动：逐页分类并推进状态
#[derive(Debug, Clone)]
pub struct Segmenter {
    classifier: PageClassifier,
    /// 开头不参与分类的页数（封面、说明、通用评分原则）
    leading_pages: usize,
}

impl Segmenter {
    pub fn new(classifier: PageClassifier, leading_pages: usize) -> Self {
        Self {
            classifier,
            leading_pages,
        }
    }

    /// 按给定顺序处理所有页
    pub fn run<I>(&self, variant: DocVariant, pages: I) -> SegmentationOutcome
    where
        I: IntoIterator<Item = Page>,
    {
        let mut state = SegmentationState::new();
        let mut trace = Vec::new();
        let mut last_index: Option<usize> = None;

        for page in pages {
            if last_index.is_some_and(|last| page.index <= last) {
                warn!("页序异常: 第 {} 页出现在第 {:?} 页之后", page.index, last_index);
            }
            last_index = Some(page.index);

            let (verdict, rule) = if page.index < self.leading_pages {
                (ClassificationVerdict::Skip, None)
            } else {
                let classification = self.classifier.classify_detailed(&page.text, variant, &state);
                (classification.verdict, classification.rule)
            };

            let page_index = page.index;
            state = state.advance(page, verdict);
            let assignment = state.assignment_after(verdict);

            debug!(
                "第 {} 页 → {} (规则: {})",
                page_index,
                verdict,
                rule.map(BoundaryRule::name).unwrap_or("-")
            );

            trace.push(PageTrace {
                page_index,
                verdict,
                rule,
                assignment,
            });
        }

        state.finish(trace)
    }
}

/// 输出图片命名
///
/// `{组成部分}_{考试季}_{年份}_{卷别}_{题号}{小问}[_subNN].{扩展名}`。
/// 序号位数按该键的页数补零（至少两位），所以同一个键下字典序始终等于页序。
#[derive(Debug, Clone, Copy)]
pub struct ImageNamer<'a> {
    identity: &'a ExamIdentity,
    extension: &'a str,
}

impl<'a> ImageNamer<'a> {
    pub fn new(identity: &'a ExamIdentity, extension: &'a str) -> Self {
        Self {
            identity,
            extension,
        }
    }

    fn prefix(&self) -> String {
        let mut prefix = format!(
            "{}_{}_{}",
            self.identity.component.slug(),
            self.identity.session.slug(),
            self.identity.year.to_ascii_lowercase()
        );
        if !self.identity.paper_variant.is_empty() {
            prefix.push('_');
            prefix.push_str(&self.identity.paper_variant);
        }
        prefix
    }

    /// 共 `page_count` 页时，第 `continuation_index` 页（0 为边界页本身）的文件名
    pub fn file_name(&self, key: &QuestionKey, continuation_index: usize, page_count: usize) -> String {
        let base = format!("{}_{}", self.prefix(), key.slug());
        if continuation_index == 0 {
            format!("{}.{}", base, self.extension)
        } else {
            let width = index_width(page_count);
            format!("{}_sub{:0width$}.{}", base, continuation_index, self.extension)
        }
    }

    /// 共 `page_count` 个未归属页时，第 `position` 页的文件名
    pub fn unassigned_file_name(&self, position: usize, page_count: usize) -> String {
        let width = index_width(page_count);
        format!("{}_unassigned_{:0width$}.{}", self.prefix(), position, self.extension)
    }
}

/// 最大序号的位数，至少两位
fn index_width(page_count: usize) -> usize {
    page_count.saturating_sub(1).to_string().len().max(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Component, Session};
    use ClassificationVerdict::*;

    fn page(index: usize) -> Page {
        Page::new(index, "", format!("p{}.png", index))
    }

    fn fold(verdicts: &[ClassificationVerdict]) -> SegmentationState {
        verdicts
            .iter()
            .enumerate()
            .fold(SegmentationState::new(), |state, (i, v)| state.advance(page(i), *v))
    }

    fn indexes(state: &SegmentationState, key: QuestionKey) -> Vec<usize> {
        state.accumulated()[&key].iter().map(|p| p.page_index).collect()
    }

    #[test]
    fn test_new_question_clears_subpart() {
        let state = fold(&[NewSubpart(1, 'a'), NewQuestion(2)]);
        assert_eq!(state.current_key(), Some(QuestionKey::question(2)));
        assert_eq!(state.current_subpart(), None);
    }

    #[test]
    fn test_continuation_preserves_subpart_and_counts() {
        let state = fold(&[NewSubpart(3, 'b'), Continuation, Continuation]);
        let key = QuestionKey::subpart(3, 'b');
        assert_eq!(state.current_key(), Some(key));
        assert_eq!(state.continuation_count(&key), Some(2));
        assert_eq!(indexes(&state, key), vec![0, 1, 2]);
    }

    #[test]
    fn test_alternative_method_keeps_current_key() {
        let state = fold(&[NewSubpart(4, 'a')]);
        let key = QuestionKey::subpart(4, 'a');
        assert_eq!(state.continuation_count(&key), Some(0));

        let state = state.advance(page(1), AlternativeMethod(4));
        assert_eq!(state.current_key(), Some(key));
        assert_eq!(state.continuation_count(&key), Some(1));
        assert_eq!(indexes(&state, key), vec![0, 1]);
    }

    #[test]
    fn test_alternative_method_switches_question_number() {
        let state = fold(&[NewSubpart(4, 'a'), AlternativeMethod(3)]);
        let key = QuestionKey::subpart(3, 'a');
        assert_eq!(state.current_key(), Some(key));
        assert_eq!(state.continuation_count(&key), Some(1));
    }

    #[test]
    fn test_skip_leaves_state_untouched() {
        let before = fold(&[NewQuestion(1), Continuation]);
        let after = before.clone().advance(page(9), Skip);
        assert_eq!(before, after);
    }

    #[test]
    fn test_leading_continuations_go_to_unassigned() {
        let state = fold(&[Continuation, Continuation, NewQuestion(1)]);
        assert_eq!(state.unassigned().len(), 2);
        assert_eq!(state.unassigned()[0].page_index, 0);
        assert_eq!(indexes(&state, QuestionKey::question(1)), vec![2]);
    }

    #[test]
    fn test_revisited_key_appends_in_page_order() {
        let state = fold(&[
            NewSubpart(1, 'a'),
            NewSubpart(1, 'b'),
            NewSubpart(1, 'a'),
            Continuation,
        ]);
        let a = QuestionKey::subpart(1, 'a');
        assert_eq!(indexes(&state, a), vec![0, 2, 3]);
        assert_eq!(indexes(&state, QuestionKey::subpart(1, 'b')), vec![1]);
        // 重新出现不会把计数清零
        assert_eq!(state.continuation_count(&a), Some(1));
        // 首次出现顺序
        let keys: Vec<_> = state.accumulated().keys().copied().collect();
        assert_eq!(keys, vec![a, QuestionKey::subpart(1, 'b')]);
    }

    #[test]
    fn test_counters_never_decrease() {
        let verdicts = [
            NewQuestion(1),
            Continuation,
            NewQuestion(1),
            Continuation,
            NewSubpart(1, 'a'),
            NewQuestion(1),
        ];
        let key = QuestionKey::question(1);
        let mut state = SegmentationState::new();
        let mut last = 0;
        for (i, v) in verdicts.iter().enumerate() {
            state = state.advance(page(i), *v);
            let count = state.continuation_count(&key).unwrap_or(0);
            assert!(count >= last);
            last = count;
        }
    }

    #[test]
    fn test_segmenter_skips_front_matter() {
        let pages = vec![
            Page::new(0, "1(a) cover page mentions", "c0.png"),
            Page::new(1, "Question 9 instructions", "c1.png"),
            Page::new(2, "1(a) Sketch", "p2.png"),
        ];
        let segmenter = Segmenter::new(PageClassifier::default(), 2);
        let outcome = segmenter.run(DocVariant::QuestionPaper, pages);

        assert_eq!(outcome.trace.len(), 3);
        assert_eq!(outcome.skipped_pages(), 2);
        assert_eq!(outcome.trace[0].assignment, PageAssignment::Skipped);
        assert_eq!(outcome.accumulated.len(), 1);
        assert_eq!(outcome.trace[2].rule, Some(BoundaryRule::Subpart));
    }

    #[test]
    fn test_image_names_sort_in_page_order() {
        let identity = ExamIdentity {
            subject_code: "9709".to_string(),
            session: Session::MayJune,
            year: "2023".to_string(),
            component: Component::Pure1,
            paper_variant: "2".to_string(),
            doc_marker: None,
        };
        let namer = ImageNamer::new(&identity, "png");
        let key = QuestionKey::subpart(7, 'a');

        assert_eq!(namer.file_name(&key, 0, 12), "pure1_mayjune_2023_2_7a.png");
        assert_eq!(namer.file_name(&key, 1, 12), "pure1_mayjune_2023_2_7a_sub01.png");

        let mut names: Vec<String> = (0..12).map(|i| namer.file_name(&key, i, 12)).collect();
        let expected = names.clone();
        names.sort();
        assert_eq!(names, expected);

        assert_eq!(
            namer.file_name(&QuestionKey::question(7), 0, 1),
            "pure1_mayjune_2023_2_7.png"
        );
        assert_eq!(namer.unassigned_file_name(0, 1), "pure1_mayjune_2023_2_unassigned_00.png");
    }

    #[test]
    fn test_image_names_widen_past_ninety_nine_continuations() {
        let identity = ExamIdentity {
            subject_code: "9709".to_string(),
            session: Session::OctNov,
            year: "2021".to_string(),
            component: Component::Mechanics,
            paper_variant: "1".to_string(),
            doc_marker: None,
        };
        let namer = ImageNamer::new(&identity, "png");
        let key = QuestionKey::question(6);

        assert_eq!(namer.file_name(&key, 1, 101), "mechanics_octnov_2021_1_6_sub001.png");
        assert_eq!(namer.file_name(&key, 100, 101), "mechanics_octnov_2021_1_6_sub100.png");

        let mut names: Vec<String> = (1..101).map(|i| namer.file_name(&key, i, 101)).collect();
        let expected = names.clone();
        names.sort();
        assert_eq!(names, expected);
        assert_eq!(namer.unassigned_file_name(3, 150), "mechanics_octnov_2021_1_unassigned_003.png");
    }
}
