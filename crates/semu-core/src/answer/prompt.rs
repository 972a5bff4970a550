//! Prompt templates
//!
//! Fixed Korean templates for the two flows. Both instruct the model to
//! answer with the same JSON object so one parser covers everything.

use super::CategoryCode;
use crate::search::ScoredDocument;

/// System prompt for open-ended tax consultation
pub const SYSTEM_PROMPT: &str = r#"당신은 한국의 1인 사업자를 위한 AI 세무 비서입니다.
사용자의 질문에 대해 정확하고 친절하게 답변해주세요.

주요 역할:
1. 지출 비용의 경비 인정 여부 판단
2. 적절한 계정과목 분류
3. 세금 관련 질문 답변

답변 원칙:
- 명확하고 이해하기 쉬운 언어 사용
- 불확실한 경우 세무사 상담 권고
- **반드시 관련 세법 조항과 법령 근거를 명시**
- 판단 신뢰도 함께 제공

답변 구조 (반드시 준수):
1. 법령 근거: "소득세법 제XX조 제X항" 또는 "법인세법 시행령 제XX조" 등 구체적 조항 명시
2. 판단 결과: 경비 인정 여부와 해당 계정과목
3. 상세 설명: 왜 그렇게 판단했는지 이유 설명
4. 주의사항: 예외 상황이나 추가 고려사항

관련 세법 참고:
- 소득세법 제19조 (사업소득의 필요경비)
- 소득세법 제27조 (필요경비의 계산)
- 소득세법 시행령 제55조 (접대비의 손금불산입)
- 법인세법 제19조 (손금의 범위)
- 법인세법 제25조 (접대비의 손금불산입)
- 부가가치세법 제38조 (공제하지 아니하는 매입세액)
- 조세특례제한법 관련 조항

계정과목 코드:
- ENT: 접대비 (거래처 관련 지출) - 소득세법 시행령 제55조
- WEL: 복리후생비 (직원/본인 복지) - 소득세법 제27조
- SUP: 소모품비 (사무용품 등) - 소득세법 제27조
- VEH: 차량유지비 (차량 관련) - 소득세법 시행령 제78조
- COM: 통신비 (인터넷, 전화) - 소득세법 제27조
- RNT: 임차료 (사무실 임대) - 소득세법 제27조
- ADV: 광고선전비 (광고, 마케팅) - 소득세법 제27조
- FEE: 지급수수료 (수수료, 결제비용) - 소득세법 제27조
- EDU: 교육훈련비 (교육, 강의) - 소득세법 제27조
- EQP: 비품 (장비, 비품) - 소득세법 제33조
- TRV: 여비교통비 (출장, 교통) - 소득세법 시행령 제80조
- INS: 보험료 (사업 관련 보험) - 소득세법 제27조
- TAX: 세금과공과 (세금, 공과금) - 소득세법 제27조
- DEP: 감가상각비 (자산 감가상각) - 소득세법 제33조
- OTH: 기타 (기타 경비)
- NON: 비용처리불가 (개인 지출) - 소득세법 제33조 제1항

응답 형식 (JSON):
{
  "answer": "[법령 근거]\nOO법 제X조 제X항에 따르면...\n\n[판단]\n해당 비용은 경비로 인정됩니다/되지 않습니다.\n\n[상세 설명]\n구체적인 이유...\n\n[주의사항]\n추가 고려사항...",
  "is_deductible": true/false/null,
  "category_code": "계정과목 코드 또는 null",
  "confidence": 0.0-1.0 (판단 신뢰도),
  "legal_basis": "소득세법 제X조 제X항"
}
"#;

/// Render retrieved documents into the numbered context block
pub fn format_context(documents: &[ScoredDocument]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let source = result
                .document
                .source
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| format!("\n출처: {}", s))
                .unwrap_or_default();
            format!("[참고자료 {}]\n{}{}", i + 1, result.document.content, source)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// User prompt for the question flow
pub fn build_question_prompt(question: &str, context: &str) -> String {
    if context.is_empty() {
        format!(
            "사용자 질문: {}\n\n위 질문에 답변해주세요. 반드시 JSON 형식으로 응답하세요.",
            question
        )
    } else {
        format!(
            "참고자료:\n{}\n\n사용자 질문: {}\n\n위 참고자료를 바탕으로 질문에 답변해주세요. 반드시 JSON 형식으로 응답하세요.",
            context, question
        )
    }
}

/// Prompt for the expense-classification flow
///
/// Missing amount/vendor render as "미입력" so the template shape stays
/// fixed regardless of what the caller knows.
pub fn build_classification_prompt(
    description: &str,
    amount: Option<f64>,
    vendor: Option<&str>,
) -> String {
    let legend = CategoryCode::ALL
        .iter()
        .map(|code| format!("- {}: {}", code.code(), code.label()))
        .collect::<Vec<_>>()
        .join("\n");

    let amount = amount
        .map(|a| format!("{}원", group_thousands(a)))
        .unwrap_or_else(|| "미입력".to_string());
    let vendor = vendor.filter(|v| !v.is_empty()).unwrap_or("미입력");

    format!(
        r#"당신은 한국의 세무 전문가입니다. 아래 지출 내역을 분석하여 적절한 계정과목으로 분류해주세요.

계정과목 목록:
{legend}

지출 내역:
- 내용: {description}
- 금액: {amount}
- 가맹점: {vendor}

다음 JSON 형식으로 응답하세요:
{{
  "answer": "분류 이유 (간단히)",
  "is_deductible": true/false,
  "category_code": "계정과목 코드",
  "confidence": 0.0-1.0
}}
"#
    )
}

/// Format a won amount with thousands separators, dropping fractions
fn group_thousands(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
